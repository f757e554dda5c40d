use serde::{Deserialize, Serialize};

use super::Catalog;

/// Orderings the catalog can be rearranged into. All sorts are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Name, ascending.
    Name,
    /// Category, ascending.
    Category,
    /// Location, ascending.
    Location,
    /// Price, highest first.
    Price,
    /// Catalogue date, newest first.
    Date,
    /// Borrow count, highest first.
    BorrowCount,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::Location => "location",
            Self::Price => "price",
            Self::Date => "date",
            Self::BorrowCount => "borrow-count",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "category" => Ok(Self::Category),
            "location" => Ok(Self::Location),
            "price" => Ok(Self::Price),
            "date" | "in-date" => Ok(Self::Date),
            "borrow-count" | "borrows" => Ok(Self::BorrowCount),
            _ => Err(format!("Invalid SortKey: {s}")),
        }
    }
}

impl Catalog {
    pub fn sort_by_key(&mut self, key: SortKey) {
        match key {
            SortKey::Name => self.sort_by_name(),
            SortKey::Category => self.sort_by_category(),
            SortKey::Location => self.sort_by_location(),
            SortKey::Price => self.sort_by_price(),
            SortKey::Date => self.sort_by_date(),
            SortKey::BorrowCount => self.sort_by_borrow_count(),
        }
        tracing::debug!(%key, "catalog sorted");
    }

    pub fn sort_by_name(&mut self) {
        self.books.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn sort_by_category(&mut self) {
        self.books.sort_by(|a, b| a.category.cmp(&b.category));
    }

    pub fn sort_by_location(&mut self) {
        self.books.sort_by(|a, b| a.location.cmp(&b.location));
    }

    pub fn sort_by_price(&mut self) {
        self.books.sort_by(|a, b| b.price.total_cmp(&a.price));
    }

    pub fn sort_by_date(&mut self) {
        self.books.sort_by(|a, b| b.in_date.cmp(&a.in_date));
    }

    pub fn sort_by_borrow_count(&mut self) {
        self.books.sort_by(|a, b| b.borrow_count.cmp(&a.borrow_count));
    }
}
