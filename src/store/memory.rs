// In-memory product store for tests and demos

use crate::error::{Error, Result};
use crate::product::Product;
use crate::store::ProductStore;
use uuid::Uuid;

/// Product store kept in a `Vec` in insertion order
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    products: Vec<Product>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first; equal timestamps keep reverse insertion order
    fn ordered(&self) -> Vec<&Product> {
        let mut ordered: Vec<&Product> = self.products.iter().rev().collect();
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        ordered
    }
}

impl ProductStore for MemoryStore {
    fn insert(&mut self, product: &Product) -> Result<()> {
        if self.products.iter().any(|p| p.id == product.id) {
            return Err(Error::Conflict(product.id));
        }
        self.products.push(product.clone());
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    fn list_page(&self, offset: usize, limit: usize) -> Result<Vec<Product>> {
        Ok(self
            .ordered()
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn list_all(&self) -> Result<Vec<Product>> {
        Ok(self.ordered().into_iter().cloned().collect())
    }

    fn search_by_name(&self, text: &str) -> Result<Vec<Product>> {
        let needle = text.to_lowercase();
        Ok(self
            .ordered()
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn update(&mut self, product: &Product) -> Result<()> {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(())
            }
            None => Err(Error::NotFound(product.id)),
        }
    }

    fn delete(&mut self, id: Uuid) -> Result<()> {
        self.products.retain(|p| p.id != id);
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.products.len())
    }
}
