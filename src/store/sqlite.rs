// SQLite-backed product store

use crate::error::{Error, Result, StoreError};
use crate::product::Product;
use crate::store::ProductStore;
use fs2::FileExt;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

const CURRENT_VERSION: u32 = 1;
const DB_FILE: &str = "products.db";
const LOCK_FILE: &str = "productstore.lock";
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Product store persisted in a single SQLite file
///
/// An on-disk store holds an exclusive lock on its directory for as long as it
/// is open, so only one process writes to a data file at a time.
pub struct SqliteStore {
    base_path: Option<PathBuf>,
    db: Connection,
    lock: Option<File>,
}

impl SqliteStore {
    /// Open or create a store in the given directory
    ///
    /// Fails with `StoreError::Locked` if another handle already holds the directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        // Create directory if it doesn't exist
        fs::create_dir_all(&base_path)?;

        let lock = Self::acquire_lock(&base_path)?;

        let db = Connection::open(base_path.join(DB_FILE))?;

        let store = Self {
            base_path: Some(base_path),
            db,
            lock: Some(lock),
        };

        store.register_functions()?;
        store.create_schema()?;
        store.create_gitignore()?;
        store.write_version()?;

        info!(path = ?store.base_path, "Opened product store");
        Ok(store)
    }

    /// Create a store that lives only in memory (no files, no lock)
    pub fn in_memory() -> Result<Self> {
        let store = Self {
            base_path: None,
            db: Connection::open_in_memory()?,
            lock: None,
        };

        store.register_functions()?;
        store.create_schema()?;
        Ok(store)
    }

    /// Directory holding the database file, `None` for in-memory stores
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    /// Close the connection and release the directory lock
    ///
    /// Dropping the store releases both as well; `close` reports failures.
    pub fn close(self) -> Result<()> {
        let SqliteStore { base_path, db, lock } = self;

        db.close().map_err(|(_, e)| Error::from(e))?;

        if let Some(lock) = lock {
            FileExt::unlock(&lock)?;
        }

        info!(path = ?base_path, "Closed product store");
        Ok(())
    }

    fn acquire_lock(base_path: &Path) -> Result<File> {
        let lock_path = base_path.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(file),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                Err(StoreError::Locked(lock_path).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// SQLite's own `lower()` and `LIKE` only fold ASCII
    fn register_functions(&self) -> Result<()> {
        self.db.create_scalar_function(
            "casefold",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: String = ctx.get(0)?;
                Ok(text.to_lowercase())
            },
        )?;
        Ok(())
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_products_created_at ON products(created_at);
            "#,
        )?;

        Ok(())
    }

    fn create_gitignore(&self) -> Result<()> {
        let Some(base_path) = &self.base_path else {
            return Ok(());
        };
        let gitignore_path = base_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(
                gitignore_path,
                format!("{DB_FILE}\n{DB_FILE}-shm\n{DB_FILE}-wal\n{DB_FILE}-journal\n{LOCK_FILE}\n"),
            )?;
        }
        Ok(())
    }

    fn write_version(&self) -> Result<()> {
        let Some(base_path) = &self.base_path else {
            return Ok(());
        };
        let version_path = base_path.join(".version");
        if !version_path.exists() {
            fs::write(version_path, CURRENT_VERSION.to_string())?;
        }
        Ok(())
    }

    fn query_products<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Product>> {
        let mut stmt = self.db.prepare(sql)?;
        let rows = stmt.query_map(params, product_from_row)?;

        let mut results = Vec::new();
        for row_result in rows {
            results.push(row_result?);
        }
        Ok(results)
    }
}

impl ProductStore for SqliteStore {
    fn insert(&mut self, product: &Product) -> Result<()> {
        let id = product.id.to_string();

        let exists: bool = self.db.query_row(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1)",
            [&id],
            |row| row.get(0),
        )?;
        if exists {
            return Err(Error::Conflict(product.id));
        }

        self.db.execute(
            &format!("INSERT INTO products ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![
                id,
                product.name,
                product.description,
                product.created_at,
                product.updated_at
            ],
        )?;

        debug!(id = %product.id, "Inserted product");
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Product>> {
        let product = self
            .db
            .query_row(
                &format!("SELECT {COLUMNS} FROM products WHERE id = ?1"),
                [id.to_string()],
                product_from_row,
            )
            .optional()?;
        Ok(product)
    }

    fn list_page(&self, offset: usize, limit: usize) -> Result<Vec<Product>> {
        self.query_products(
            &format!(
                "SELECT {COLUMNS} FROM products ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2"
            ),
            params![to_sql_int(limit), to_sql_int(offset)],
        )
    }

    fn list_all(&self) -> Result<Vec<Product>> {
        self.query_products(
            &format!("SELECT {COLUMNS} FROM products ORDER BY created_at DESC, rowid DESC"),
            [],
        )
    }

    fn search_by_name(&self, text: &str) -> Result<Vec<Product>> {
        self.query_products(
            &format!(
                "SELECT {COLUMNS} FROM products
                 WHERE instr(casefold(name), ?1) > 0
                 ORDER BY created_at DESC, rowid DESC"
            ),
            [text.to_lowercase()],
        )
    }

    fn update(&mut self, product: &Product) -> Result<()> {
        let changed = self.db.execute(
            "UPDATE products SET name = ?1, description = ?2, created_at = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                product.name,
                product.description,
                product.created_at,
                product.updated_at,
                product.id.to_string()
            ],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(product.id));
        }

        debug!(id = %product.id, "Updated product");
        Ok(())
    }

    fn delete(&mut self, id: Uuid) -> Result<()> {
        let removed = self
            .db
            .execute("DELETE FROM products WHERE id = ?1", [id.to_string()])?;
        debug!(%id, removed, "Deleted product");
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    Ok(Product {
        id,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn to_sql_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
