use chrono::{Duration, Local, NaiveDate};

use super::Catalog;
use crate::models::Book;

/// Today's date on the local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Read-only views over the collection. Results keep the catalog's current
/// order unless stated otherwise.
impl Catalog {
    pub fn all(&self) -> Vec<Book> {
        self.books.clone()
    }

    fn filtered(&self, pred: impl Fn(&Book) -> bool) -> Vec<Book> {
        self.books.iter().filter(|b| pred(b)).cloned().collect()
    }

    /// Books due back within `days` days from today, inclusive.
    pub fn due_in_days(&self, days: i64) -> Vec<Book> {
        self.due_in_days_on(today(), days)
    }

    /// Books whose due date is between `today` and `today + days`, inclusive.
    pub fn due_in_days_on(&self, today: NaiveDate, days: i64) -> Vec<Book> {
        self.filtered(|b| {
            b.return_date.is_some_and(|due| {
                let diff = (due - today).num_days();
                (0..=days).contains(&diff)
            })
        })
    }

    pub fn by_category(&self, category: &str) -> Vec<Book> {
        self.filtered(|b| contains_ignore_case(&b.category, category))
    }

    pub fn by_location(&self, location: &str) -> Vec<Book> {
        self.filtered(|b| contains_ignore_case(&b.location, location))
    }

    pub fn available(&self) -> Vec<Book> {
        self.filtered(Book::is_available)
    }

    pub fn borrowed(&self) -> Vec<Book> {
        self.filtered(Book::is_borrowed)
    }

    /// Keyword search over name, category, location and index id.
    pub fn search(&self, keyword: &str) -> Vec<Book> {
        self.filtered(|b| b.matches_keyword(keyword))
    }

    /// Most borrowed books first, ties kept in catalog order.
    ///
    /// A `limit` of 0 returns every book.
    pub fn top_borrowed(&self, limit: usize) -> Vec<Book> {
        let mut result = self.books.clone();
        result.sort_by(|a, b| b.borrow_count.cmp(&a.borrow_count));
        if limit > 0 {
            result.truncate(limit);
        }
        result
    }

    /// Books catalogued within the last `days` days.
    pub fn recently_added(&self, days: i64) -> Vec<Book> {
        self.recently_added_on(today(), days)
    }

    /// A window reaching past the representable calendar covers every date
    /// when `days` is positive and none when it is negative.
    pub fn recently_added_on(&self, today: NaiveDate, days: i64) -> Vec<Book> {
        match Duration::try_days(days).and_then(|span| today.checked_sub_signed(span)) {
            Some(cutoff) => self.filtered(|b| b.in_date >= cutoff),
            None if days > 0 => self.all(),
            None => Vec::new(),
        }
    }

    pub fn expensive(&self, min_price: f64) -> Vec<Book> {
        self.filtered(|b| b.price >= min_price)
    }

    pub fn cheap(&self, max_price: f64) -> Vec<Book> {
        self.filtered(|b| b.price <= max_price)
    }
}
