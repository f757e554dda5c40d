pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod models;
pub mod sample;
pub mod session;
pub mod storage;

pub use catalog::{Catalog, SortKey};
pub use command::{Command, Outcome};
pub use config::{AppConfig, AuthConfig, QueryConfig};
pub use error::{CatalogError, ExitCode, Result};
pub use models::*;
pub use session::{Role, Session};
