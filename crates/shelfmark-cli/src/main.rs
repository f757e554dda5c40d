use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfmark_core::{
    AppConfig, Book, BookEdit, Catalog, CatalogError, CatalogStats, Command, Outcome, Session, SortKey,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "shelfmark",
    about = "Book inventory manager for a small library",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting SHELFMARK_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Catalog file to operate on (overrides config and SHELFMARK_CATALOG).
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// User name for this session. Also read from SHELFMARK_USER.
    #[arg(long, global = true)]
    user: Option<String>,

    /// Password for this session. Also read from SHELFMARK_PASSWORD.
    #[arg(long, global = true)]
    password: Option<String>,

    /// Log in as administrator (requires the admin password).
    #[arg(long, global = true)]
    admin: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every book in catalog order.
    List,

    /// Add a new book.
    Add {
        index_id: String,
        name: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "1")]
        quantity: u32,
        #[arg(long, default_value = "0")]
        price: f64,
        /// Catalogue date (YYYY-MM-DD), defaults to today.
        #[arg(long, value_parser = parse_date_arg)]
        in_date: Option<NaiveDate>,
    },

    /// Edit fields of an existing book.
    Edit {
        index_id: String,
        #[arg(long)]
        new_id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        quantity: Option<u32>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long, value_parser = parse_date_arg)]
        in_date: Option<NaiveDate>,
        #[arg(long)]
        borrow_count: Option<u32>,
    },

    /// Remove a book.
    Remove {
        index_id: String,
        #[arg(long)]
        confirm: bool,
    },

    /// Lend one copy of a book.
    Borrow {
        index_id: String,
        /// Due date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date_arg)]
        due: NaiveDate,
    },

    /// Take one copy of a book back.
    Return { index_id: String },

    /// Find a book by exact title (case-insensitive).
    Find { name: String },

    /// Keyword search over title, category, location and index id.
    Search { keyword: String },

    /// Books due back within N days.
    Due {
        #[arg(long)]
        days: Option<i64>,
    },

    /// Books whose category contains the given text.
    Category { category: String },

    /// Books whose location contains the given text.
    Location { location: String },

    /// Books with copies on the shelf.
    Available,

    /// Books with copies out or none on the shelf.
    Borrowed,

    /// Most borrowed books.
    Top {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Books catalogued in the last N days.
    Recent {
        #[arg(long)]
        days: Option<i64>,
    },

    /// Books priced at or above a minimum.
    Expensive {
        #[arg(long)]
        min: Option<f64>,
    },

    /// Books priced at or below a maximum.
    Cheap {
        #[arg(long)]
        max: Option<f64>,
    },

    /// Show catalog statistics.
    Stats,

    /// Reorder the catalog: name, category, location, price, date, borrow-count.
    Sort { key: SortKey },

    /// Replace the catalog with a JSON file (import / restore).
    #[command(alias = "import", alias = "restore")]
    Open { path: PathBuf },

    /// Write the catalog to another JSON file (export).
    #[command(alias = "export")]
    Save { path: PathBuf },

    /// Write a timestamped backup of the catalog.
    Backup {
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Fill an empty catalog with demonstration books.
    Seed,

    /// Show the current session.
    Whoami,

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information.
    Version,
}

// ─── Config Actions ──────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Get a specific config key.
    Get { key: String },
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    // ── Env var overrides ──────────────────────────────────────────────────
    let json_output = cli.json || std::env::var("SHELFMARK_JSON").as_deref() == Ok("1");

    let mut config = AppConfig::load()?;
    if let Ok(path) = std::env::var("SHELFMARK_CATALOG") {
        config.set_catalog_path(path.into());
    }
    if let Some(path) = cli.catalog.clone() {
        config.set_catalog_path(path);
    }

    init_tracing(&config);

    let session = match open_session(&cli, &config) {
        Ok(session) => session,
        Err(e) => fail(&e, json_output, start),
    };

    let command = match cli.command {
        Commands::Whoami => {
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":session,"meta":{"duration_ms":dur}}))?;
            } else {
                println!("{} ({})", session.user, session.role);
            }
            return Ok(());
        }
        Commands::Config { action } => {
            run_config(action, &config, json_output, start)?;
            return Ok(());
        }
        Commands::Version => {
            let version = env!("CARGO_PKG_VERSION");
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"version":version},"meta":{"duration_ms":dur}}))?;
            } else {
                println!("shelfmark v{version}");
            }
            return Ok(());
        }
        other => other,
    };

    let catalog_path = config.catalog_path();
    let mut catalog = Catalog::new();
    if catalog_path.exists() {
        if let Err(e) = catalog.load(&catalog_path) {
            fail(&e, json_output, start);
        }
    } else {
        tracing::info!(path = %catalog_path.display(), "no catalog file yet, starting empty");
    }

    let command = match to_command(command, &catalog) {
        Ok(command) => command,
        Err(e) => fail(&e, json_output, start),
    };

    let mutates = command.mutates();
    let outcome = match command.execute(&session, &mut catalog, &config) {
        Ok(outcome) => outcome,
        Err(e) => fail(&e, json_output, start),
    };
    if mutates {
        if let Err(e) = catalog.save(&catalog_path) {
            fail(&e, json_output, start);
        }
    }

    let dur = start.elapsed().as_millis();
    if json_output {
        print_json(&serde_json::json!({"status":"ok","data":outcome,"meta":{"duration_ms":dur}}))?;
    } else {
        render(&outcome);
    }

    Ok(())
}

// ─── Dispatch ───────────────────────────────────────────────────────────────

/// Build the catalog command for a subcommand. `catalog` is the loaded
/// collection edits are applied to.
fn to_command(cmd: Commands, catalog: &Catalog) -> shelfmark_core::Result<Command> {
    let command = match cmd {
        Commands::List => Command::ShowAll,
        Commands::Add { index_id, name, location, category, quantity, price, in_date } => {
            let in_date = in_date.unwrap_or_else(|| Local::now().date_naive());
            Command::Add {
                book: Book::new(index_id, name, in_date)
                    .with_location(location)
                    .with_category(category)
                    .with_quantity(quantity)
                    .with_price(price),
            }
        }
        Commands::Edit {
            index_id,
            new_id,
            name,
            location,
            category,
            quantity,
            price,
            in_date,
            borrow_count,
        } => {
            let current = catalog
                .get(&index_id)
                .ok_or_else(|| CatalogError::NotFound(index_id.clone()))?;
            let edit = BookEdit {
                index_id: new_id,
                name,
                location,
                category,
                quantity,
                price,
                in_date,
                borrow_count,
            };
            let book = edit.apply(current)?;
            Command::Edit { index_id, book }
        }
        Commands::Remove { index_id, confirm } => {
            if !confirm {
                return Err(CatalogError::InvalidArgument(format!(
                    "refusing to remove {index_id} without --confirm"
                )));
            }
            Command::Remove { index_id }
        }
        Commands::Borrow { index_id, due } => Command::Borrow { index_id, due },
        Commands::Return { index_id } => Command::Return { index_id },
        Commands::Find { name } => Command::FindByName { name },
        Commands::Search { keyword } => Command::Search { keyword },
        Commands::Due { days } => Command::DueSoon { days },
        Commands::Category { category } => Command::FilterCategory { category },
        Commands::Location { location } => Command::FilterLocation { location },
        Commands::Available => Command::ShowAvailable,
        Commands::Borrowed => Command::ShowBorrowed,
        Commands::Top { limit } => Command::TopBorrowed { limit },
        Commands::Recent { days } => Command::RecentlyAdded { days },
        Commands::Expensive { min } => Command::Expensive { min_price: min },
        Commands::Cheap { max } => Command::Cheap { max_price: max },
        Commands::Stats => Command::Statistics,
        Commands::Sort { key } => Command::Sort { key },
        Commands::Open { path } => Command::Open { path },
        Commands::Save { path } => Command::Save { path },
        Commands::Backup { dir } => Command::Backup { dir },
        Commands::Seed => Command::Seed,
        Commands::Whoami | Commands::Config { .. } | Commands::Version => {
            return Err(CatalogError::InvalidArgument(
                "not a catalog command".to_string(),
            ));
        }
    };
    Ok(command)
}

fn open_session(cli: &Cli, config: &AppConfig) -> shelfmark_core::Result<Session> {
    let user = cli
        .user
        .clone()
        .or_else(|| std::env::var("SHELFMARK_USER").ok())
        .unwrap_or_else(|| "guest".to_string());
    let password = cli
        .password
        .clone()
        .or_else(|| std::env::var("SHELFMARK_PASSWORD").ok());
    let password = match password {
        Some(p) => p,
        // readers need no secret; admins must supply one
        None if !cli.admin => "guest".to_string(),
        None => String::new(),
    };
    Session::login(&user, &password, cli.admin, &config.auth)
}

fn run_config(action: ConfigAction, config: &AppConfig, json_output: bool, start: Instant) -> Result<()> {
    let dur = start.elapsed().as_millis();
    let kv = config_key_values(config);
    match action {
        ConfigAction::List => {
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":kv,"meta":{"duration_ms":dur}}))?;
            } else {
                for (k, v) in &kv {
                    println!("{k} = {v}");
                }
            }
        }
        ConfigAction::Get { key } => match kv.get(key.as_str()) {
            Some(val) => {
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"key":key,"value":val},"meta":{"duration_ms":dur}}))?;
                } else {
                    println!("{val}");
                }
            }
            None => {
                eprintln!("Unknown config key: {key}");
                std::process::exit(shelfmark_core::ExitCode::NotFound as i32);
            }
        },
    }
    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("shelfmark_core={0},shelfmark={0}", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    shelfmark_core::parse_date(s).map_err(|e| e.to_string())
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

/// Report `err` in the selected output format and exit with its code.
fn fail(err: &CatalogError, json_output: bool, start: Instant) -> ! {
    let dur = start.elapsed().as_millis();
    if json_output {
        let body = serde_json::json!({"status":"error","message":err.to_string(),"meta":{"duration_ms":dur}});
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err}");
    }
    std::process::exit(err.exit_code() as i32);
}

fn render(outcome: &Outcome) {
    match outcome {
        Outcome::Books(books) if books.is_empty() => println!("No matching books."),
        Outcome::Books(books) => {
            for book in books {
                print_book_row(book);
            }
            println!("\n{} book(s)", books.len());
        }
        Outcome::Book(book) => print_book_row(book),
        Outcome::Stats(stats) => print_stats(stats),
        Outcome::Message(msg) => println!("{msg}"),
    }
}

fn print_book_row(book: &Book) {
    let due = book.return_date.map(|d| d.to_string()).unwrap_or_default();
    let status = if book.available { "in" } else { "out" };
    println!(
        "{id:<8}  {name:<36}  {category:<18}  {location:<18}  {qty:>3}  {price:>8.2}  {in_date}  {due:<10}  {borrows:>4}  {status}",
        id = book.index_id,
        name = book.name,
        category = book.category,
        location = book.location,
        qty = book.quantity,
        price = book.price,
        in_date = book.in_date,
        borrows = book.borrow_count,
    );
}

fn print_stats(stats: &CatalogStats) {
    println!("Catalog statistics:");
    println!("  Total books:        {}", stats.total);
    println!("  Available:          {}", stats.available);
    println!("  Borrowed:           {}", stats.borrowed);
    println!("  Total value:        {:.2}", stats.total_value);
    println!("  Top category:       {}", stats.most_popular_category);
    println!("  Top location:       {}", stats.most_popular_location);
    println!("  Borrowed share:     {:.1}%", stats.borrowed_percent);
}

fn config_key_values(config: &AppConfig) -> std::collections::BTreeMap<&'static str, String> {
    let mut map = std::collections::BTreeMap::new();
    map.insert("catalog_path", config.catalog_path().to_string_lossy().to_string());
    map.insert("backup_dir", config.backup_dir().to_string_lossy().to_string());
    map.insert("config_path", AppConfig::config_path().to_string_lossy().to_string());
    map.insert("queries.due_soon_days", config.queries.due_soon_days.to_string());
    map.insert("queries.top_borrowed_limit", config.queries.top_borrowed_limit.to_string());
    map.insert("queries.recent_days", config.queries.recent_days.to_string());
    map.insert("queries.expensive_min_price", config.queries.expensive_min_price.to_string());
    map.insert("queries.cheap_max_price", config.queries.cheap_max_price.to_string());
    map.insert("logging.level", config.logging.level.clone());
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let in_date = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        Catalog::from_books([Book::new("CS001", "Compilers", in_date).with_borrow_count(4)])
    }

    fn edit(index_id: &str, borrow_count: Option<u32>) -> Commands {
        Commands::Edit {
            index_id: index_id.to_string(),
            new_id: None,
            name: Some("Compilers, 2nd ed.".to_string()),
            location: None,
            category: None,
            quantity: None,
            price: None,
            in_date: None,
            borrow_count,
        }
    }

    #[test]
    fn test_remove_without_confirm_is_invalid_args() {
        let cmd = Commands::Remove { index_id: "CS001".to_string(), confirm: false };
        let err = to_command(cmd, &catalog()).unwrap_err();
        assert_eq!(err.exit_code(), shelfmark_core::ExitCode::InvalidArgs);
    }

    #[test]
    fn test_edit_builds_on_loaded_record() {
        match to_command(edit("CS001", Some(5)), &catalog()).unwrap() {
            Command::Edit { index_id, book } => {
                assert_eq!(index_id, "CS001");
                assert_eq!(book.name, "Compilers, 2nd ed.");
                assert_eq!(book.borrow_count, 5);
            }
            _ => panic!("expected an edit command"),
        }
    }

    #[test]
    fn test_edit_rejects_lower_borrow_count() {
        let err = to_command(edit("CS001", Some(2)), &catalog()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
    }

    #[test]
    fn test_edit_unknown_book_is_not_found() {
        let err = to_command(edit("NOPE", None), &catalog()).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }
}
