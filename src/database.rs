use std::sync::Arc;

use lazy_static::lazy_static;

use crate::buffer_pool::BufferPool;
use crate::catalog::Catalog;

lazy_static! {
    static ref GLOBAL_DB: Arc<Database> = Arc::new(Database::new());
}

/// A handle to the process-wide database instance. All tables share one
/// catalog and one buffer pool, mirroring a single running server process.
pub fn get_global_db() -> Arc<Database> {
    Arc::clone(&GLOBAL_DB)
}

pub struct Database {
    buffer_pool: Arc<BufferPool>,
    catalog: Catalog,
}

impl Database {
    pub fn new() -> Self {
        let buffer_pool = Arc::new(BufferPool::new());
        let catalog = Catalog::new(Arc::clone(&buffer_pool));
        Database { buffer_pool, catalog }
    }

    /// Construct a database whose buffer pool is capped at `capacity` pages,
    /// for tests that exercise eviction and `BufferPoolFull`.
    pub fn with_pool_size(capacity: usize) -> Self {
        let buffer_pool = Arc::new(BufferPool::with_capacity(capacity));
        let catalog = Catalog::new(Arc::clone(&buffer_pool));
        Database { buffer_pool, catalog }
    }

    pub fn get_buffer_pool(&self) -> Arc<BufferPool> {
        Arc::clone(&self.buffer_pool)
    }

    pub fn get_catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}
