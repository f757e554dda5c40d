use serde::{Deserialize, Serialize};

/// Summary figures for the whole catalog, as shown on the statistics screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total: usize,
    pub available: usize,
    pub borrowed: usize,
    /// Sum of `price * quantity` over every record.
    pub total_value: f64,
    pub most_popular_category: String,
    pub most_popular_location: String,
    /// `borrowed / total * 100`, 0 for an empty catalog.
    pub borrowed_percent: f64,
}
