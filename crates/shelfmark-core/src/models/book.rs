use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// ─── Book ───────────────────────────────────────────────────

/// One catalogued title. `index_id` is the catalog's primary key.
///
/// Serialized with camelCase field names (`indexId`, `inDate`, ...) as a
/// flat JSON object inside the catalog array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub index_id: String,
    pub name: String,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub category: String,

    /// Copies currently on the shelf.
    #[serde(default)]
    pub quantity: u32,

    #[serde(default)]
    pub price: f64,

    pub in_date: NaiveDate,

    /// Due date of the most recent loan. `None` once the book is returned.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub return_date: Option<NaiveDate>,

    #[serde(default)]
    pub borrow_count: u32,

    /// Cached `quantity > 0`.
    #[serde(default)]
    pub available: bool,
}

impl Book {
    /// Create a book with a single copy on the shelf, catalogued on `in_date`.
    pub fn new(index_id: impl Into<String>, name: impl Into<String>, in_date: NaiveDate) -> Self {
        Self {
            index_id: index_id.into(),
            name: name.into(),
            location: String::new(),
            category: String::new(),
            quantity: 1,
            price: 0.0,
            in_date,
            return_date: None,
            borrow_count: 0,
            available: true,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self.sync_availability();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_borrow_count(mut self, borrow_count: u32) -> Self {
        self.borrow_count = borrow_count;
        self
    }

    pub fn with_return_date(mut self, return_date: Option<NaiveDate>) -> Self {
        self.return_date = return_date;
        self
    }

    /// Re-derive `available` from `quantity`.
    pub fn sync_availability(&mut self) {
        self.available = self.quantity > 0;
    }

    /// Copies can be lent right now.
    pub fn is_available(&self) -> bool {
        self.available && self.quantity > 0
    }

    /// At least one copy is out, or the shelf is empty.
    pub fn is_borrowed(&self) -> bool {
        !self.available || self.quantity == 0
    }

    /// Stock value of this record: unit price times copies on the shelf.
    pub fn stock_value(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    /// Case-insensitive substring match over name, category, location and index id.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        [&self.name, &self.category, &self.location, &self.index_id]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

// ─── BookEdit ───────────────────────────────────────────────

/// Field changes for an existing record. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookEdit {
    pub index_id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<u32>,
    pub price: Option<f64>,
    pub in_date: Option<NaiveDate>,
    pub borrow_count: Option<u32>,
}

impl BookEdit {
    /// The replacement record for `current` with these changes applied.
    ///
    /// `borrow_count` may only grow.
    pub fn apply(self, current: &Book) -> crate::Result<Book> {
        let mut book = current.clone();
        if let Some(count) = self.borrow_count {
            if count < current.borrow_count {
                return Err(crate::CatalogError::InvalidArgument(format!(
                    "borrow count for {} cannot go below {}",
                    current.index_id, current.borrow_count
                )));
            }
            book.borrow_count = count;
        }
        if let Some(v) = self.index_id {
            book.index_id = v;
        }
        if let Some(v) = self.name {
            book.name = v;
        }
        if let Some(v) = self.location {
            book.location = v;
        }
        if let Some(v) = self.category {
            book.category = v;
        }
        if let Some(v) = self.quantity {
            book.quantity = v;
        }
        if let Some(v) = self.price {
            book.price = v;
        }
        if let Some(v) = self.in_date {
            book.in_date = v;
        }
        book.sync_availability();
        Ok(book)
    }
}

/// Parse a `YYYY-MM-DD` date as typed by a user or stored in the catalog.
pub fn parse_date(s: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| crate::CatalogError::InvalidDate(s.to_string()))
}

/// Accepts a date string, `""`, `null`, or a missing field. Only the first
/// yields a date; a non-empty string that is not a date is a decode error.
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
