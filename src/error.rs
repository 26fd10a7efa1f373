// Error types for the product store and service

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::product::{DESCRIPTION_MAX_LEN, NAME_MAX_LEN, NAME_MIN_LEN};

/// Errors returned by `ProductService` and `ProductStore` implementations
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("product not found: {0}")]
    NotFound(Uuid),

    #[error("product already exists: {0}")]
    Conflict(Uuid),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    /// The validation failure, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(v) => Some(v),
            _ => None,
        }
    }
}

// Lets store code use `?` directly on rusqlite calls
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(StoreError::Sqlite(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Store(StoreError::Io(err))
    }
}

/// Input rejected before anything reaches the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name length must be between {} and {} characters (got {})", NAME_MIN_LEN, NAME_MAX_LEN, .0)]
    NameLength(usize),

    #[error("description length must not exceed {} characters (got {})", DESCRIPTION_MAX_LEN, .0)]
    DescriptionLength(usize),

    #[error("page number must be at least 1 (got {0})")]
    PageNumber(usize),

    #[error("page size must be greater than 0")]
    PageSize,

    #[error("search text must not be empty")]
    EmptyQuery,

    #[error("created_at ({created_at}) is later than updated_at ({updated_at})")]
    Timestamps { created_at: i64, updated_at: i64 },
}

impl ValidationError {
    /// Name of the input field the error refers to, for field-level feedback
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NameLength(_) => "name",
            ValidationError::DescriptionLength(_) => "description",
            ValidationError::PageNumber(_) => "page",
            ValidationError::PageSize => "page_size",
            ValidationError::EmptyQuery => "query",
            ValidationError::Timestamps { .. } => "updated_at",
        }
    }
}

/// Failures of the underlying persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store is locked by another process: {0}")]
    Locked(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_fields() {
        assert_eq!(ValidationError::NameLength(2).field(), "name");
        assert_eq!(ValidationError::DescriptionLength(300).field(), "description");
        assert_eq!(ValidationError::PageNumber(0).field(), "page");
        assert_eq!(ValidationError::PageSize.field(), "page_size");
        assert_eq!(ValidationError::EmptyQuery.field(), "query");
        let timestamps = ValidationError::Timestamps {
            created_at: 20,
            updated_at: 10,
        };
        assert_eq!(timestamps.field(), "updated_at");
    }

    #[test]
    fn test_validation_error_display() {
        let msg = ValidationError::NameLength(2).to_string();
        assert!(msg.contains("between 3 and 50"));
        assert!(msg.contains("got 2"));

        let msg = ValidationError::DescriptionLength(256).to_string();
        assert!(msg.contains("255"));
    }

    #[test]
    fn test_error_from_validation() {
        let err: Error = ValidationError::EmptyQuery.into();
        assert_eq!(err.as_validation(), Some(&ValidationError::EmptyQuery));
        assert!(err.to_string().starts_with("validation failed"));
    }

    #[test]
    fn test_error_from_sqlite() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Store(StoreError::Sqlite(_))));
        assert!(err.as_validation().is_none());
    }
}
