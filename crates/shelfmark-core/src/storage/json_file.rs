use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::error::{CatalogError, Result};
use crate::models::Book;

/// Write the whole catalog as a pretty-printed JSON array, truncating `path`.
pub fn write_books(path: &Path, books: &[Book]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CatalogError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(books)?;
    fs::write(path, json).map_err(|source| CatalogError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Read and decode a catalog file. See [`decode_books`] for what is skipped.
pub fn read_books(path: &Path) -> Result<Vec<Book>> {
    let contents = fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    decode_books(&contents)
}

/// Decode a catalog document.
///
/// The document must be a JSON array; anything else is rejected whole.
/// Elements that are not objects, that fail to decode into a [`Book`], that
/// carry a blank `indexId`, or that repeat an earlier `indexId` are skipped.
/// `available` is re-derived from `quantity` for every kept record.
pub fn decode_books(contents: &str) -> Result<Vec<Book>> {
    let root: Value = serde_json::from_str(contents)?;
    let Value::Array(items) = root else {
        return Err(CatalogError::NotAnArray);
    };

    let mut seen = HashSet::new();
    let mut books = Vec::with_capacity(items.len());
    for (pos, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            tracing::warn!(pos, "skipping non-object catalog entry");
            continue;
        }
        let mut book: Book = match serde_json::from_value(item) {
            Ok(book) => book,
            Err(e) => {
                tracing::warn!(pos, error = %e, "skipping invalid catalog entry");
                continue;
            }
        };
        if book.index_id.trim().is_empty() {
            tracing::warn!(pos, "skipping catalog entry with empty indexId");
            continue;
        }
        if !seen.insert(book.index_id.clone()) {
            tracing::warn!(pos, index_id = %book.index_id, "skipping duplicate indexId");
            continue;
        }
        book.sync_availability();
        books.push(book);
    }
    Ok(books)
}

/// Write a timestamped copy of the catalog, `{dir}/backup_YYYYMMDD_HHMMSS.json`.
pub fn backup_books(dir: &Path, books: &[Book], now: NaiveDateTime) -> Result<PathBuf> {
    let path = dir.join(format!("backup_{}.json", now.format("%Y%m%d_%H%M%S")));
    write_books(&path, books)?;
    tracing::info!(path = %path.display(), count = books.len(), "catalog backed up");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_write_and_read_books() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");

        let books = vec![
            Book::new("CS001", "Compilers", date(2023, 1, 15)).with_price(45.8),
            Book::new("CS002", "Algorithms", date(2023, 2, 20))
                .with_quantity(0)
                .with_return_date(Some(date(2024, 1, 15))),
        ];
        write_books(&path, &books).unwrap();

        let loaded = read_books(&path).unwrap();
        assert_eq!(loaded, books);
    }

    #[test]
    fn test_written_file_is_pretty_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        write_books(&path, &[Book::new("A", "Alpha", date(2023, 1, 1))]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with('['));
        assert!(text.contains('\n'));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("catalog.json");
        write_books(&path, &[]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_books(Path::new("/tmp/nonexistent_shelfmark_catalog.json")).unwrap_err();
        assert!(matches!(err, CatalogError::ReadFile { .. }));
    }

    #[test]
    fn test_decode_rejects_non_array() {
        let err = decode_books(r#"{"indexId":"A"}"#).unwrap_err();
        assert!(matches!(err, CatalogError::NotAnArray));
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let err = decode_books("[{").unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn test_decode_skips_bad_entries() {
        let doc = r#"[
            42,
            "text",
            {"indexId":"A","name":"Alpha","inDate":"2023-01-01","quantity":2},
            {"name":"No id","inDate":"2023-01-01"},
            {"indexId":"  ","name":"Blank","inDate":"2023-01-01"},
            {"indexId":"A","name":"Dup","inDate":"2023-01-01"},
            {"indexId":"B","name":"Beta","inDate":"not-a-date"},
            {"indexId":"C","name":"Gamma","inDate":"2023-03-01","returnDate":""}
        ]"#;
        let books = decode_books(doc).unwrap();
        let ids: Vec<&str> = books.iter().map(|b| b.index_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(books[0].name, "Alpha");
    }

    #[test]
    fn test_decode_rederives_available() {
        let doc = r#"[
            {"indexId":"A","name":"Alpha","inDate":"2023-01-01","quantity":2,"available":false},
            {"indexId":"B","name":"Beta","inDate":"2023-01-01","quantity":0,"available":true}
        ]"#;
        let books = decode_books(doc).unwrap();
        assert!(books[0].available);
        assert!(!books[1].available);
    }

    #[test]
    fn test_backup_file_name() {
        let dir = TempDir::new().unwrap();
        let now = date(2024, 6, 1).and_hms_opt(9, 5, 3).unwrap();
        let books = vec![Book::new("A", "Alpha", date(2023, 1, 1))];

        let path = backup_books(dir.path(), &books, now).unwrap();
        assert_eq!(path.file_name().unwrap(), "backup_20240601_090503.json");
        assert_eq!(read_books(&path).unwrap(), books);
    }
}
