use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, SortKey};
use crate::config::AppConfig;
use crate::error::{CatalogError, Result};
use crate::models::{Book, CatalogStats};
use crate::session::Session;
use crate::storage::json_file;

/// Every action a presenter can ask of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Add {
        book: Book,
    },
    Edit {
        index_id: String,
        book: Book,
    },
    Remove {
        index_id: String,
    },
    Borrow {
        index_id: String,
        due: NaiveDate,
    },
    Return {
        index_id: String,
    },
    FindByName {
        name: String,
    },
    ShowAll,
    DueSoon {
        days: Option<i64>,
    },
    FilterCategory {
        category: String,
    },
    FilterLocation {
        location: String,
    },
    ShowAvailable,
    ShowBorrowed,
    Search {
        keyword: String,
    },
    TopBorrowed {
        limit: Option<usize>,
    },
    RecentlyAdded {
        days: Option<i64>,
    },
    Expensive {
        min_price: Option<f64>,
    },
    Cheap {
        max_price: Option<f64>,
    },
    Statistics,
    Sort {
        key: SortKey,
    },
    /// Replace the catalog with the contents of a file (open, import, restore).
    Open {
        path: PathBuf,
    },
    /// Write the catalog to a file (save as, export).
    Save {
        path: PathBuf,
    },
    /// Timestamped copy into `dir`, or the configured backup directory.
    Backup {
        dir: Option<PathBuf>,
    },
    Seed,
}

/// What a command hands back for the presenter to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    Books(Vec<Book>),
    Book(Book),
    Stats(CatalogStats),
    Message(String),
}

impl Command {
    /// Short name used in logs and permission messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Remove { .. } => "remove",
            Self::Borrow { .. } => "borrow",
            Self::Return { .. } => "return",
            Self::FindByName { .. } => "find",
            Self::ShowAll => "list",
            Self::DueSoon { .. } => "due",
            Self::FilterCategory { .. } => "category",
            Self::FilterLocation { .. } => "location",
            Self::ShowAvailable => "available",
            Self::ShowBorrowed => "borrowed",
            Self::Search { .. } => "search",
            Self::TopBorrowed { .. } => "top",
            Self::RecentlyAdded { .. } => "recent",
            Self::Expensive { .. } => "expensive",
            Self::Cheap { .. } => "cheap",
            Self::Statistics => "stats",
            Self::Sort { .. } => "sort",
            Self::Open { .. } => "open",
            Self::Save { .. } => "save",
            Self::Backup { .. } => "backup",
            Self::Seed => "seed",
        }
    }

    /// Commands a reader session may not run.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::Add { .. } | Self::Edit { .. } | Self::Remove { .. } | Self::Open { .. } | Self::Seed
        )
    }

    /// Commands that change the catalog and should be persisted afterwards.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Self::Add { .. }
                | Self::Edit { .. }
                | Self::Remove { .. }
                | Self::Borrow { .. }
                | Self::Return { .. }
                | Self::Sort { .. }
                | Self::Open { .. }
                | Self::Seed
        )
    }

    /// Check permissions, run against `catalog`, and report the result.
    pub fn execute(self, session: &Session, catalog: &mut Catalog, config: &AppConfig) -> Result<Outcome> {
        if self.requires_admin() && !session.is_admin() {
            return Err(CatalogError::PermissionDenied(self.name().to_string()));
        }
        tracing::debug!(command = self.name(), user = %session.user, "dispatching");

        let q = &config.queries;
        let outcome = match self {
            Self::Add { book } => {
                let name = book.name.clone();
                catalog.add(book)?;
                Outcome::Message(format!("Added book: {name}"))
            }
            Self::Edit { index_id, book } => {
                let name = book.name.clone();
                catalog.update(&index_id, book)?;
                Outcome::Message(format!("Updated book: {name}"))
            }
            Self::Remove { index_id } => {
                if !catalog.remove(&index_id) {
                    return Err(CatalogError::NotFound(index_id));
                }
                Outcome::Message(format!("Removed book: {index_id}"))
            }
            Self::Borrow { index_id, due } => Outcome::Book(catalog.borrow(&index_id, due)?.clone()),
            Self::Return { index_id } => Outcome::Book(catalog.return_book(&index_id)?.clone()),
            Self::FindByName { name } => catalog
                .find_by_name(&name)
                .cloned()
                .map(Outcome::Book)
                .ok_or(CatalogError::NotFound(name))?,
            Self::ShowAll => Outcome::Books(catalog.all()),
            Self::DueSoon { days } => {
                Outcome::Books(catalog.due_in_days(days.unwrap_or(q.due_soon_days)))
            }
            Self::FilterCategory { category } => Outcome::Books(catalog.by_category(&category)),
            Self::FilterLocation { location } => Outcome::Books(catalog.by_location(&location)),
            Self::ShowAvailable => Outcome::Books(catalog.available()),
            Self::ShowBorrowed => Outcome::Books(catalog.borrowed()),
            Self::Search { keyword } => Outcome::Books(catalog.search(keyword.trim())),
            Self::TopBorrowed { limit } => {
                Outcome::Books(catalog.top_borrowed(limit.unwrap_or(q.top_borrowed_limit)))
            }
            Self::RecentlyAdded { days } => {
                Outcome::Books(catalog.recently_added(days.unwrap_or(q.recent_days)))
            }
            Self::Expensive { min_price } => {
                Outcome::Books(catalog.expensive(min_price.unwrap_or(q.expensive_min_price)))
            }
            Self::Cheap { max_price } => {
                Outcome::Books(catalog.cheap(max_price.unwrap_or(q.cheap_max_price)))
            }
            Self::Statistics => Outcome::Stats(catalog.stats()),
            Self::Sort { key } => {
                catalog.sort_by_key(key);
                Outcome::Books(catalog.all())
            }
            Self::Open { path } => {
                let count = catalog.load(&path)?;
                Outcome::Message(format!("Loaded {count} books from {}", path.display()))
            }
            Self::Save { path } => {
                catalog.save(&path)?;
                Outcome::Message(format!("Saved {} books to {}", catalog.len(), path.display()))
            }
            Self::Backup { dir } => {
                let dir = dir.unwrap_or_else(|| config.backup_dir());
                let path = json_file::backup_books(&dir, catalog.books(), Local::now().naive_local())?;
                Outcome::Message(format!("Backup written to {}", path.display()))
            }
            Self::Seed => {
                let added = catalog.seed_samples();
                if added == 0 {
                    Outcome::Message("Catalog is not empty; no sample books added".to_string())
                } else {
                    Outcome::Message(format!("Added {added} sample books"))
                }
            }
        };
        Ok(outcome)
    }
}
