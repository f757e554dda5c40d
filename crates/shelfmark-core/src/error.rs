use std::path::PathBuf;

use thiserror::Error;

/// All errors that can occur in shelfmark-core.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("empty index")]
    EmptyIndex,

    #[error("duplicate index: {0}")]
    DuplicateIndex(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate new index: {0}")]
    DuplicateNewIndex(String),

    #[error("not available: {0}")]
    NotAvailable(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{field} overflow: {index_id}")]
    Overflow { index_id: String, field: &'static str },

    #[error("Cannot open file for reading: {}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open file for writing: {}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON parse failed: top-level value is not an array")]
    NotAnArray,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Permission denied: {0} requires admin mode")]
    PermissionDenied(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl CatalogError {
    /// Process exit code for this error category.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::NotFound(_) => ExitCode::NotFound,
            Self::EmptyIndex | Self::InvalidDate(_) | Self::InvalidArgument(_) => {
                ExitCode::InvalidArgs
            }
            Self::DuplicateIndex(_)
            | Self::DuplicateNewIndex(_)
            | Self::NotAvailable(_)
            | Self::Overflow { .. } => ExitCode::Conflict,
            Self::ReadFile { .. } | Self::WriteFile { .. } | Self::Io(_) => {
                ExitCode::FileSystemError
            }
            Self::Json(_) | Self::NotAnArray => ExitCode::FormatError,
            Self::InvalidCredentials(_) | Self::PermissionDenied(_) => ExitCode::PermissionDenied,
            Self::ConfigError(_) | Self::TomlParse(_) | Self::TomlSerialize(_) => {
                ExitCode::GeneralError
            }
        }
    }
}

/// Exit codes returned by the `shelfmark` binary.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    FileSystemError = 4,
    FormatError = 5,
    PermissionDenied = 6,
    Conflict = 7,
}

pub type Result<T> = std::result::Result<T, CatalogError>;
