// JSONL export/import of products

use crate::product::Product;
use eyre::{Context, Result};
use fs2::FileExt;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Write products to a JSONL file, one product per line, replacing its contents
pub fn write_jsonl(path: &Path, products: &[Product]) -> Result<usize> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .context("Failed to open JSONL file for writing")?;

    // Acquire exclusive lock before truncating
    file.lock_exclusive().context("Failed to acquire file lock")?;
    file.set_len(0).context("Failed to truncate JSONL file")?;

    let mut writer = BufWriter::new(&file);
    for product in products {
        let json = serde_json::to_string(product)?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()?;
    drop(writer);
    file.sync_all()?; // Ensure data is flushed to disk

    info!(file = ?path, count = products.len(), "Exported products to JSONL");

    // Lock is automatically released when file is dropped
    Ok(products.len())
}

/// Read products from a JSONL file, keeping the latest version per id
///
/// For duplicate ids the line with the highest `updated_at` wins. Blank lines
/// are ignored and malformed lines are skipped with a warning. The result is
/// ordered oldest first so re-inserting it preserves relative order. Files are
/// written newest first, so among equal `created_at` values the later line is
/// the older insert.
pub fn read_jsonl_latest(path: &Path) -> Result<Vec<Product>> {
    let file = File::open(path).context("Failed to open JSONL file")?;
    let reader = BufReader::new(file);
    let mut products: HashMap<Uuid, (usize, Product)> = HashMap::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let product: Product = match serde_json::from_str(&line) {
            Ok(p) => p,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
                continue;
            }
        };

        // Keep the product with the latest updated_at
        let keep_existing = products
            .get(&product.id)
            .is_some_and(|(_, existing)| existing.updated_at >= product.updated_at);
        if !keep_existing {
            products.insert(product.id, (line_num, product));
        }
    }

    let mut latest: Vec<(usize, Product)> = products.into_values().collect();
    latest.sort_by_key(|(line_num, p)| (p.created_at, Reverse(*line_num)));

    info!(
        file = ?path,
        count = latest.len(),
        "Loaded latest products from JSONL"
    );

    Ok(latest.into_iter().map(|(_, p)| p).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn product(id: &str, name: &str, created_at: i64, updated_at: i64) -> Product {
        Product {
            id: Uuid::parse_str(id).unwrap(),
            name: name.to_string(),
            description: None,
            created_at,
            updated_at,
        }
    }

    const ID_1: &str = "0190f7a0-0000-7000-8000-000000000001";
    const ID_2: &str = "0190f7a0-0000-7000-8000-000000000002";

    #[test]
    fn test_write_jsonl() {
        let temp = TempDir::new().unwrap();
        let jsonl_path = temp.path().join("products.jsonl");

        let count = write_jsonl(&jsonl_path, &[product(ID_1, "Test", 1000, 1000)]).unwrap();
        assert_eq!(count, 1);

        let content = fs::read_to_string(&jsonl_path).unwrap();
        assert!(content.contains(&format!("\"id\":\"{}\"", ID_1)));
        assert!(content.contains("\"name\":\"Test\""));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_write_jsonl_replaces_contents() {
        let temp = TempDir::new().unwrap();
        let jsonl_path = temp.path().join("products.jsonl");

        write_jsonl(&jsonl_path, &[product(ID_1, "One", 1, 1), product(ID_2, "Two", 2, 2)]).unwrap();
        write_jsonl(&jsonl_path, &[product(ID_1, "One", 1, 1)]).unwrap();

        assert_eq!(read_jsonl_latest(&jsonl_path).unwrap().len(), 1);
    }

    #[test]
    fn test_read_jsonl_latest() {
        let temp = TempDir::new().unwrap();
        let jsonl_path = temp.path().join("products.jsonl");

        // Two versions of the same product, newest first in the file
        let newer = product(ID_1, "Version 2", 1000, 2000);
        let older = product(ID_1, "Version 1", 1000, 1000);
        let other = product(ID_2, "Other", 500, 500);
        write_jsonl(&jsonl_path, &[newer, older, other]).unwrap();

        let products = read_jsonl_latest(&jsonl_path).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Other");
        assert_eq!(products[1].name, "Version 2");
        assert_eq!(products[1].updated_at, 2000);
    }

    #[test]
    fn test_read_jsonl_equal_created_at_reverses_lines() {
        let temp = TempDir::new().unwrap();
        let jsonl_path = temp.path().join("products.jsonl");

        // Newest insert first, as list_all orders ties
        write_jsonl(&jsonl_path, &[product(ID_2, "Second", 5000, 5000), product(ID_1, "First", 5000, 5000)]).unwrap();

        let products = read_jsonl_latest(&jsonl_path).unwrap();
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_write_jsonl_shorter_rewrite_leaves_no_tail() {
        let temp = TempDir::new().unwrap();
        let jsonl_path = temp.path().join("products.jsonl");

        let long_name = "A much longer product name than the second one";
        write_jsonl(&jsonl_path, &[product(ID_1, long_name, 1, 1)]).unwrap();
        write_jsonl(&jsonl_path, &[product(ID_2, "Two", 2, 2)]).unwrap();

        let content = fs::read_to_string(&jsonl_path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(!content.contains(long_name));
        assert_eq!(read_jsonl_latest(&jsonl_path).unwrap()[0].name, "Two");
    }

    #[test]
    fn test_read_jsonl_nonexistent_file() {
        let temp = TempDir::new().unwrap();
        assert!(read_jsonl_latest(&temp.path().join("nonexistent.jsonl")).is_err());
    }

    #[test]
    fn test_read_jsonl_malformed_line() {
        let temp = TempDir::new().unwrap();
        let jsonl_path = temp.path().join("products.jsonl");

        // Write valid record, then malformed, then another valid
        fs::write(
            &jsonl_path,
            format!(
                "{{\"id\":\"{ID_1}\",\"name\":\"Valid\",\"created_at\":1000,\"updated_at\":1000}}\n\
                 {{malformed json}}\n\
                 \n\
                 {{\"id\":\"{ID_2}\",\"name\":\"Also Valid\",\"description\":\"d\",\"created_at\":1001,\"updated_at\":1001}}\n"
            ),
        )
        .unwrap();

        let products = read_jsonl_latest(&jsonl_path).unwrap();
        // Should skip malformed line and load the two valid records
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Valid");
        assert_eq!(products[1].description.as_deref(), Some("d"));
    }
}
