// Product service: the single place where product rules are enforced
//
// Every create/update/import passes through the same field validation before
// the store is touched, and each operation performs at most one store mutation.

use crate::error::{Error, Result, ValidationError};
use crate::product::{DESCRIPTION_MAX_LEN, NAME_MAX_LEN, NAME_MIN_LEN, Product, now_ms};
use crate::store::ProductStore;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One page of products plus the totals needed to render page navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-based page number
    pub number: usize,
    pub size: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub items: Vec<Product>,
}

/// Outcome of restoring a batch of exported products
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    /// Products whose id was already present
    pub skipped: usize,
}

/// Validation, identity and timestamp authority layered over a `ProductStore`
pub struct ProductService<S: ProductStore> {
    store: S,
    clock: Box<dyn Fn() -> i64 + Send>,
}

impl<S: ProductStore> ProductService<S> {
    /// Create a service that owns `store` and reads time from the system clock
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Box::new(now_ms),
        }
    }

    /// Replace the millisecond clock used for `created_at`/`updated_at`
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> i64 + Send + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Borrow the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the store back, e.g. to close it explicitly
    pub fn into_store(self) -> S {
        self.store
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Create a product with a fresh id and `created_at == updated_at == now`
    pub fn create(&mut self, name: &str, description: Option<&str>) -> Result<Product> {
        let (name, description) = validate_fields(name, description)?;

        let product = Product::new(name, description, self.now());
        self.store.insert(&product)?;

        info!(id = %product.id, name = %product.name, "Created product");
        Ok(product)
    }

    /// Look up a product; a missing id is `Ok(None)`
    pub fn get(&self, id: Uuid) -> Result<Option<Product>> {
        self.store.get(id)
    }

    /// Re-validate and persist an edited product
    ///
    /// `created_at` is always taken from the stored product, whatever the
    /// caller passes, and `updated_at` never moves backwards.
    pub fn update(&mut self, product: &Product) -> Result<Product> {
        let (name, description) = validate_fields(&product.name, product.description.as_deref())?;

        let existing = self.store.get(product.id)?.ok_or(Error::NotFound(product.id))?;

        let updated = Product {
            id: existing.id,
            name,
            description,
            created_at: existing.created_at,
            updated_at: self.now().max(existing.updated_at),
        };
        self.store.update(&updated)?;

        info!(id = %updated.id, name = %updated.name, "Updated product");
        Ok(updated)
    }

    /// Delete a product; deleting a missing id is not an error
    pub fn delete(&mut self, id: Uuid) -> Result<()> {
        self.store.delete(id)?;
        info!(%id, "Deleted product");
        Ok(())
    }

    /// Insert a previously exported product, keeping its id and timestamps
    ///
    /// Fails with `Error::Conflict` if the id is already present.
    pub fn import(&mut self, product: &Product) -> Result<Product> {
        let (name, description) = validate_fields(&product.name, product.description.as_deref())?;
        if product.created_at > product.updated_at {
            return Err(ValidationError::Timestamps {
                created_at: product.created_at,
                updated_at: product.updated_at,
            }
            .into());
        }

        let imported = Product {
            id: product.id,
            name,
            description,
            created_at: product.created_at,
            updated_at: product.updated_at,
        };
        self.store.insert(&imported)?;

        debug!(id = %imported.id, "Imported product");
        Ok(imported)
    }

    /// Import products in order, skipping ids that already exist
    ///
    /// Stops at the first other failure; products imported before it stay.
    pub fn import_all(&mut self, products: &[Product]) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        for product in products {
            match self.import(product) {
                Ok(_) => summary.imported += 1,
                Err(Error::Conflict(id)) => {
                    warn!(%id, "Product already exists, skipping");
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!(id = %product.id, error = %e, "Import stopped");
                    return Err(e);
                }
            }
        }

        info!(imported = summary.imported, skipped = summary.skipped, "Imported products");
        Ok(summary)
    }

    // ========================================================================
    // Listing, paging and search
    // ========================================================================

    /// Every product, newest first
    pub fn list_all(&self) -> Result<Vec<Product>> {
        self.store.list_all()
    }

    /// Products on 1-based page `page_number` with `page_size` products per page
    pub fn list_page(&self, page_number: usize, page_size: usize) -> Result<Vec<Product>> {
        let offset = page_offset(page_number, page_size)?;
        debug!(page_number, page_size, offset, "Listing page");
        self.store.list_page(offset, page_size)
    }

    /// A page together with the totals for navigation
    pub fn page(&self, page_number: usize, page_size: usize) -> Result<Page> {
        let items = self.list_page(page_number, page_size)?;
        let total_count = self.total_count()?;

        Ok(Page {
            number: page_number,
            size: page_size,
            total_count,
            total_pages: total_count.div_ceil(page_size),
            items,
        })
    }

    /// Products whose name contains `text` (trimmed), ignoring case
    ///
    /// Results are not paginated. Blank text is rejected; callers that want
    /// everything use `list_page` or `list_all` instead.
    pub fn search(&self, text: &str) -> Result<Vec<Product>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }
        self.store.search_by_name(text)
    }

    pub fn total_count(&self) -> Result<usize> {
        self.store.count()
    }

    /// Number of pages of `page_size` needed to show every product (0 when empty)
    pub fn total_pages(&self, page_size: usize) -> Result<usize> {
        if page_size == 0 {
            return Err(ValidationError::PageSize.into());
        }
        Ok(self.total_count()?.div_ceil(page_size))
    }
}

/// Trim and check name and description, returning the values to store
fn validate_fields(
    name: &str,
    description: Option<&str>,
) -> std::result::Result<(String, Option<String>), ValidationError> {
    let name = name.trim();
    let name_len = name.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name_len) {
        return Err(ValidationError::NameLength(name_len));
    }

    // Length is checked before trimming
    let description = match description {
        Some(d) => {
            let len = d.chars().count();
            if len > DESCRIPTION_MAX_LEN {
                return Err(ValidationError::DescriptionLength(len));
            }
            Some(d.trim().to_string())
        }
        None => None,
    };

    Ok((name.to_string(), description))
}

fn page_offset(page_number: usize, page_size: usize) -> std::result::Result<usize, ValidationError> {
    if page_number < 1 {
        return Err(ValidationError::PageNumber(page_number));
    }
    if page_size == 0 {
        return Err(ValidationError::PageSize);
    }
    Ok((page_number - 1).saturating_mul(page_size))
}
