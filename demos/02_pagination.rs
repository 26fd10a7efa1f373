//! Example 02: Pagination and Search
//!
//! This example fills an in-memory store, walks it page by page, and runs a
//! case-insensitive name search.
//!
//! Run with: cargo run --example 02_pagination

use eyre::Result;
use productstore::{MemoryStore, ProductService};

fn main() -> Result<()> {
    println!("ProductStore Pagination Example");
    println!("===============================\n");

    let mut service = ProductService::new(MemoryStore::new());

    let names = [
        "Apple iPhone",
        "Apple MacBook",
        "Samsung Galaxy",
        "Google Pixel",
        "Sony Walkman",
        "Apple Watch",
        "Kindle Paperwhite",
    ];
    for name in names {
        service.create(name, None)?;
    }

    let page_size = 3;
    println!(
        "{} products, {} per page -> {} pages\n",
        service.total_count()?,
        page_size,
        service.total_pages(page_size)?
    );

    for number in 1..=service.total_pages(page_size)? {
        let page = service.page(number, page_size)?;
        println!("Page {} of {}:", page.number, page.total_pages);
        for product in &page.items {
            println!("   - {}", product.name);
        }
    }
    println!();

    println!("Search \"APPLE\":");
    for product in service.search("APPLE")? {
        println!("   - {}", product.name);
    }
    println!();

    println!("Example complete!");
    Ok(())
}
