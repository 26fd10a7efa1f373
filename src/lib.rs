// ProductStore - Product records with validation, pagination and search over SQLite

pub mod config;
pub mod error;
pub mod jsonl;
pub mod product;
pub mod service;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::{Error, Result, StoreError, ValidationError};
pub use product::{DESCRIPTION_MAX_LEN, NAME_MAX_LEN, NAME_MIN_LEN, Product, now_ms};
pub use service::{ImportSummary, Page, ProductService};
pub use store::{MemoryStore, ProductStore, SqliteStore};

// Re-export uuid so callers can parse ids without a direct dependency
pub use uuid::Uuid;
