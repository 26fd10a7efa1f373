// Persistence contract for products
//
// Stores are dumb: they never validate names or touch timestamps. Ordering for
// every listing is `created_at` descending, ties broken by most recent insert.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::product::Product;
use uuid::Uuid;

/// Durable keyed storage of products
pub trait ProductStore {
    /// Store a new product
    ///
    /// Fails with `Error::Conflict` if a product with the same id exists.
    fn insert(&mut self, product: &Product) -> Result<()>;

    /// Point lookup; a missing id is `Ok(None)`
    fn get(&self, id: Uuid) -> Result<Option<Product>>;

    /// Skip `offset` products and return at most `limit`, newest first
    fn list_page(&self, offset: usize, limit: usize) -> Result<Vec<Product>>;

    /// Every product, newest first
    fn list_all(&self) -> Result<Vec<Product>>;

    /// Products whose name contains `text`, ignoring case, newest first
    fn search_by_name(&self, text: &str) -> Result<Vec<Product>>;

    /// Replace the stored product with the same id
    ///
    /// Fails with `Error::NotFound` if no such product exists.
    fn update(&mut self, product: &Product) -> Result<()>;

    /// Remove a product; a missing id is a no-op
    fn delete(&mut self, id: Uuid) -> Result<()>;

    /// Total number of stored products
    fn count(&self) -> Result<usize>;
}
