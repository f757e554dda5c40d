use std::collections::HashMap;

use super::Catalog;
use crate::models::CatalogStats;

/// Value with the highest count; ties go to the value that appears first.
fn most_common<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        let slot = *slots.entry(value).or_insert_with(|| {
            counts.push((value, 0));
            counts.len() - 1
        });
        counts[slot].1 += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string()).unwrap_or_default()
}

impl Catalog {
    pub fn total_books(&self) -> usize {
        self.books.len()
    }

    pub fn available_books(&self) -> usize {
        self.books.iter().filter(|b| b.is_available()).count()
    }

    pub fn borrowed_books(&self) -> usize {
        self.books.iter().filter(|b| b.is_borrowed()).count()
    }

    pub fn books_in_category(&self, category: &str) -> usize {
        let needle = category.to_lowercase();
        self.books
            .iter()
            .filter(|b| b.category.to_lowercase().contains(&needle))
            .count()
    }

    /// Sum of `price * quantity` across the catalog.
    pub fn total_value(&self) -> f64 {
        self.books.iter().map(|b| b.stock_value()).sum()
    }

    pub fn most_popular_category(&self) -> String {
        most_common(self.books.iter().map(|b| b.category.as_str()))
    }

    pub fn most_popular_location(&self) -> String {
        most_common(self.books.iter().map(|b| b.location.as_str()))
    }

    pub fn stats(&self) -> CatalogStats {
        let total = self.total_books();
        let borrowed = self.borrowed_books();
        let borrowed_percent = if total > 0 {
            borrowed as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        CatalogStats {
            total,
            available: self.available_books(),
            borrowed,
            total_value: self.total_value(),
            most_popular_category: self.most_popular_category(),
            most_popular_location: self.most_popular_location(),
            borrowed_percent,
        }
    }
}
