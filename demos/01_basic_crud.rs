//! Example 01: Basic CRUD Operations
//!
//! This example demonstrates create, read, update, and delete through
//! `ProductService` on an on-disk store.
//!
//! Run with: cargo run --example 01_basic_crud

use eyre::Result;
use productstore::{Error, ProductService, SqliteStore};

fn main() -> Result<()> {
    // Create a temporary directory for this example
    let temp_dir = tempfile::tempdir()?;
    let store_path = temp_dir.path().to_path_buf();

    println!("ProductStore Basic CRUD Example");
    println!("===============================\n");
    println!("Store path: {}\n", store_path.display());

    let mut service = ProductService::new(SqliteStore::open(&store_path)?);
    println!("Store opened successfully.\n");

    // CREATE: names and descriptions are trimmed
    println!("1. CREATE - Adding a new product...");
    let product = service.create("  Mechanical Keyboard  ", Some("Tenkeyless, brown switches"))?;
    println!("   Created product with ID: {}", product.id);
    println!("   Stored name: {:?}\n", product.name);

    // READ
    println!("2. READ - Retrieving the product...");
    match service.get(product.id)? {
        Some(found) => {
            println!("   - Name: {}", found.name);
            println!("   - Description: {}", found.description_or_empty());
        }
        None => println!("   Product not found!"),
    }
    println!();

    // UPDATE: re-validated, updated_at refreshed, created_at kept
    println!("3. UPDATE - Renaming the product...");
    let mut edited = product.clone();
    edited.name = "Mechanical Keyboard (TKL)".to_string();
    let updated = service.update(&edited)?;
    println!("   New name: {}", updated.name);
    println!("   created_at unchanged: {}", updated.created_at == product.created_at);
    println!();

    // VALIDATION: the service rejects bad input before touching the store
    println!("4. VALIDATION - Trying a two-character name...");
    match service.create("KB", None) {
        Err(Error::Validation(v)) => println!("   Rejected ({}): {}\n", v.field(), v),
        other => println!("   Unexpected result: {:?}\n", other),
    }

    // DELETE: idempotent
    println!("5. DELETE - Removing the product twice...");
    service.delete(product.id)?;
    service.delete(product.id)?;
    println!("   Product exists = {}\n", service.get(product.id)?.is_some());

    service.into_store().close()?;
    println!("Example complete!");
    Ok(())
}
