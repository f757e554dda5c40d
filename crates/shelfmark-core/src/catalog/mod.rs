//! The in-memory book collection and its mutations.
//!
//! Queries live in [`queries`], statistics in [`stats`], in-place orderings
//! in [`sort`].

pub mod queries;
pub mod sort;
pub mod stats;

use std::path::Path;

use chrono::NaiveDate;

use crate::error::{CatalogError, Result};
use crate::models::Book;
use crate::sample;
use crate::storage::json_file;

pub use sort::SortKey;

/// Ordered set of book records with unique `index_id`s.
///
/// Every mutation either succeeds completely or leaves the collection as it
/// was. `available == (quantity > 0)` holds for every record after each
/// call returns.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: Vec<Book>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from existing records, dropping blank and repeated ids.
    pub fn from_books(books: impl IntoIterator<Item = Book>) -> Self {
        let mut catalog = Self::new();
        for book in books {
            if let Err(e) = catalog.add(book) {
                tracing::warn!(error = %e, "dropping record");
            }
        }
        catalog
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, index_id: &str) -> Option<&Book> {
        self.position(index_id).map(|pos| &self.books[pos])
    }

    fn position(&self, index_id: &str) -> Option<usize> {
        self.books.iter().position(|b| b.index_id == index_id)
    }

    // ─── Persistence ───────────────────────────────────────

    /// Replace the whole collection with the contents of `path`.
    ///
    /// Returns the number of records loaded. On any error the current
    /// collection is kept.
    pub fn load(&mut self, path: &Path) -> Result<usize> {
        let books = json_file::read_books(path)?;
        tracing::info!(path = %path.display(), count = books.len(), "catalog loaded");
        self.books = books;
        Ok(self.books.len())
    }

    /// Overwrite `path` with the whole collection.
    pub fn save(&self, path: &Path) -> Result<()> {
        json_file::write_books(path, &self.books)?;
        tracing::info!(path = %path.display(), count = self.books.len(), "catalog saved");
        Ok(())
    }

    // ─── Mutations ─────────────────────────────────────────

    /// Append a new record. Fails on an empty or already present `index_id`.
    pub fn add(&mut self, mut book: Book) -> Result<()> {
        if book.index_id.trim().is_empty() {
            return Err(CatalogError::EmptyIndex);
        }
        if self.position(&book.index_id).is_some() {
            return Err(CatalogError::DuplicateIndex(book.index_id));
        }
        book.sync_availability();
        tracing::debug!(index_id = %book.index_id, "book added");
        self.books.push(book);
        Ok(())
    }

    /// Delete the record with `index_id`. Returns `false` if there was none.
    pub fn remove(&mut self, index_id: &str) -> bool {
        match self.position(index_id) {
            Some(pos) => {
                self.books.remove(pos);
                tracing::debug!(index_id, "book removed");
                true
            }
            None => false,
        }
    }

    /// Replace the record `index_id` in place with `book`.
    ///
    /// `book.index_id` may differ from `index_id` as long as no other record
    /// already uses it.
    pub fn update(&mut self, index_id: &str, mut book: Book) -> Result<()> {
        let pos = self
            .position(index_id)
            .ok_or_else(|| CatalogError::NotFound(index_id.to_string()))?;
        if book.index_id != index_id && self.position(&book.index_id).is_some() {
            return Err(CatalogError::DuplicateNewIndex(book.index_id));
        }
        if book.index_id.trim().is_empty() {
            return Err(CatalogError::EmptyIndex);
        }
        book.sync_availability();
        tracing::debug!(index_id, new_index_id = %book.index_id, "book updated");
        self.books[pos] = book;
        Ok(())
    }

    /// First record whose name equals `name`, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&Book> {
        let needle = name.to_lowercase();
        self.books.iter().find(|b| b.name.to_lowercase() == needle)
    }

    /// Lend one copy of `index_id`, due back on `due`.
    pub fn borrow(&mut self, index_id: &str, due: NaiveDate) -> Result<&Book> {
        let pos = self
            .position(index_id)
            .ok_or_else(|| CatalogError::NotFound(index_id.to_string()))?;
        let book = &mut self.books[pos];
        if !book.is_available() {
            return Err(CatalogError::NotAvailable(index_id.to_string()));
        }
        let borrow_count = book.borrow_count.checked_add(1).ok_or_else(|| CatalogError::Overflow {
            index_id: index_id.to_string(),
            field: "borrowCount",
        })?;
        book.quantity -= 1;
        book.borrow_count = borrow_count;
        book.sync_availability();
        book.return_date = Some(due);
        tracing::debug!(index_id, %due, quantity = book.quantity, "book borrowed");
        Ok(&self.books[pos])
    }

    /// Take one copy of `index_id` back and clear its due date.
    ///
    /// This does not check that a copy was actually out.
    pub fn return_book(&mut self, index_id: &str) -> Result<&Book> {
        let pos = self
            .position(index_id)
            .ok_or_else(|| CatalogError::NotFound(index_id.to_string()))?;
        let book = &mut self.books[pos];
        book.quantity = book.quantity.checked_add(1).ok_or_else(|| CatalogError::Overflow {
            index_id: index_id.to_string(),
            field: "quantity",
        })?;
        book.sync_availability();
        book.return_date = None;
        tracing::debug!(index_id, quantity = book.quantity, "book returned");
        Ok(&self.books[pos])
    }

    /// Add the demonstration inventory if the catalog is empty.
    ///
    /// Returns how many records were added.
    pub fn seed_samples(&mut self) -> usize {
        if !self.is_empty() {
            return 0;
        }
        self.books = sample::sample_books();
        self.books.iter_mut().for_each(Book::sync_availability);
        tracing::info!(count = self.books.len(), "sample books seeded");
        self.books.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn book(id: &str, name: &str) -> Book {
        Book::new(id, name, date(2023, 1, 1))
    }

    fn ids(catalog: &Catalog) -> Vec<&str> {
        catalog.books().iter().map(|b| b.index_id.as_str()).collect()
    }

    fn assert_consistent(catalog: &Catalog) {
        for b in catalog.books() {
            assert_eq!(b.available, b.quantity > 0, "{}", b.index_id);
        }
        let mut seen = std::collections::HashSet::new();
        for b in catalog.books() {
            assert!(seen.insert(&b.index_id), "duplicate {}", b.index_id);
        }
    }

    #[test]
    fn test_add_appends() {
        let mut catalog = Catalog::new();
        catalog.add(book("A", "Alpha")).unwrap();
        catalog.add(book("B", "Beta")).unwrap();
        assert_eq!(ids(&catalog), vec!["A", "B"]);
    }

    #[test]
    fn test_add_rejects_empty_index() {
        let mut catalog = Catalog::new();
        let err = catalog.add(book("  ", "Blank")).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyIndex));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_index() {
        let mut catalog = Catalog::new();
        catalog.add(book("X", "First")).unwrap();
        let err = catalog.add(book("X", "Second")).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateIndex(ref id) if id == "X"));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.books()[0].name, "First");
    }

    #[test]
    fn test_add_normalizes_available() {
        let mut catalog = Catalog::new();
        let mut b = book("A", "Alpha");
        b.quantity = 0;
        b.available = true;
        catalog.add(b).unwrap();
        assert!(!catalog.books()[0].available);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut catalog = Catalog::from_books([book("A", "a"), book("B", "b"), book("C", "c")]);
        assert!(catalog.remove("B"));
        assert_eq!(ids(&catalog), vec!["A", "C"]);
        assert!(!catalog.remove("B"));
    }

    #[test]
    fn test_update_in_place() {
        let mut catalog = Catalog::from_books([book("A", "a"), book("B", "b"), book("C", "c")]);
        catalog.update("B", book("B2", "renamed").with_quantity(4)).unwrap();
        assert_eq!(ids(&catalog), vec!["A", "B2", "C"]);
        assert_eq!(catalog.books()[1].name, "renamed");
        assert_eq!(catalog.books()[1].quantity, 4);
    }

    #[test]
    fn test_update_same_id() {
        let mut catalog = Catalog::from_books([book("A", "a")]);
        catalog.update("A", book("A", "new name")).unwrap();
        assert_eq!(catalog.books()[0].name, "new name");
    }

    #[test]
    fn test_update_not_found() {
        let mut catalog = Catalog::from_books([book("A", "a")]);
        let err = catalog.update("Z", book("Z", "z")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn test_update_rejects_colliding_new_id() {
        let mut catalog = Catalog::from_books([book("A", "a"), book("B", "b")]);
        let err = catalog.update("A", book("B", "clash")).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateNewIndex(_)));
        assert_eq!(catalog.books()[0].name, "a");
        assert_eq!(catalog.books()[1].name, "b");
    }

    #[test]
    fn test_uniqueness_across_add_and_update() {
        let mut catalog = Catalog::new();
        for (id, name) in [("A", "a"), ("B", "b"), ("A", "again"), ("C", "c")] {
            let _ = catalog.add(book(id, name));
        }
        let _ = catalog.update("C", book("A", "steal"));
        let _ = catalog.update("C", book("D", "d"));
        let _ = catalog.update("D", book("B", "steal"));
        assert_eq!(ids(&catalog), vec!["A", "B", "D"]);
        assert_consistent(&catalog);
    }

    #[test]
    fn test_find_by_name_case_insensitive() {
        let catalog = Catalog::from_books([book("A", "Rust in Action"), book("B", "rust in action")]);
        assert_eq!(catalog.find_by_name("RUST IN ACTION").unwrap().index_id, "A");
        assert!(catalog.find_by_name("Rust").is_none());
    }

    #[test]
    fn test_borrow_scenario() {
        let mut catalog = Catalog::from_books([book("A", "Alpha")]);
        let due = date(2024, 6, 1);

        let b = catalog.borrow("A", due).unwrap();
        assert_eq!(b.quantity, 0);
        assert!(!b.available);
        assert_eq!(b.borrow_count, 1);
        assert_eq!(b.return_date, Some(due));

        let err = catalog.borrow("A", date(2024, 7, 1)).unwrap_err();
        assert!(matches!(err, CatalogError::NotAvailable(_)));
        let b = catalog.get("A").unwrap();
        assert_eq!(b.quantity, 0);
        assert_eq!(b.borrow_count, 1);
        assert_eq!(b.return_date, Some(due));

        let b = catalog.return_book("A").unwrap();
        assert_eq!(b.quantity, 1);
        assert!(b.available);
        assert_eq!(b.borrow_count, 1);
        assert!(b.return_date.is_none());
    }

    #[test]
    fn test_borrow_multi_copy_stays_available() {
        let mut catalog = Catalog::from_books([book("A", "Alpha").with_quantity(3)]);
        let b = catalog.borrow("A", date(2024, 6, 1)).unwrap();
        assert_eq!(b.quantity, 2);
        assert!(b.available);
        assert_consistent(&catalog);
    }

    #[test]
    fn test_borrow_and_return_not_found() {
        let mut catalog = Catalog::new();
        assert!(matches!(
            catalog.borrow("A", date(2024, 6, 1)).unwrap_err(),
            CatalogError::NotFound(_)
        ));
        assert!(matches!(
            catalog.return_book("A").unwrap_err(),
            CatalogError::NotFound(_)
        ));
    }

    #[test]
    fn test_return_is_permissive() {
        let mut catalog = Catalog::from_books([book("A", "Alpha")]);
        let b = catalog.return_book("A").unwrap();
        assert_eq!(b.quantity, 2);
        assert!(b.available);
    }

    #[test]
    fn test_return_at_max_quantity_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"indexId":"A","name":"Alpha","inDate":"2023-01-01","quantity":4294967295}]"#,
        )
        .unwrap();
        let mut catalog = Catalog::new();
        catalog.load(&path).unwrap();
        let before = catalog.get("A").unwrap().clone();

        let err = catalog.return_book("A").unwrap_err();
        assert!(matches!(err, CatalogError::Overflow { field: "quantity", .. }));
        assert_eq!(catalog.get("A").unwrap(), &before);
        assert!(catalog.get("A").unwrap().available);
    }

    #[test]
    fn test_borrow_at_max_borrow_count_is_rejected() {
        let mut catalog =
            Catalog::from_books([book("A", "Alpha").with_quantity(2).with_borrow_count(u32::MAX)]);
        let due = date(2024, 6, 1);

        let err = catalog.borrow("A", due).unwrap_err();
        assert!(matches!(err, CatalogError::Overflow { field: "borrowCount", .. }));
        let b = catalog.get("A").unwrap();
        assert_eq!(b.quantity, 2);
        assert_eq!(b.borrow_count, u32::MAX);
        assert!(b.return_date.is_none());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");

        let mut catalog = Catalog::new();
        catalog.seed_samples();
        catalog.borrow("CS001", date(2024, 6, 1)).unwrap();
        catalog.save(&path).unwrap();

        let mut loaded = Catalog::new();
        let count = loaded.load(&path).unwrap();
        assert_eq!(count, catalog.len());
        assert_eq!(loaded.books(), catalog.books());
    }

    #[test]
    fn test_failed_load_keeps_collection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();

        let mut catalog = Catalog::from_books([book("A", "Alpha")]);
        assert!(catalog.load(&path).is_err());
        assert!(catalog.load(&dir.path().join("missing.json")).is_err());
        assert_eq!(ids(&catalog), vec!["A"]);
    }

    #[test]
    fn test_seed_samples_only_when_empty() {
        let mut catalog = Catalog::new();
        let added = catalog.seed_samples();
        assert_eq!(added, 32);
        assert_consistent(&catalog);
        assert_eq!(catalog.seed_samples(), 0);
    }
}
