use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::thread;

use log::{debug, warn};

use crate::config::{DEFAULT_POOL_SIZE, LOCK_RETRY_INTERVAL};
use crate::error::{DbError, DbResult};
use crate::heap_page::{HeapPage, HeapPageId, Permission};
use crate::lock_table::{AcquireResult, LockTable};
use crate::transaction::TransactionId;

/// Anything the buffer pool can read a page from and flush a page back to.
/// `HeapFile` is the only implementor; the trait exists so the pool doesn't
/// need to know about tables, catalogs, or any global registry — it only
/// needs a page source per file id.
pub trait PageSource: Send + Sync {
    fn read_page(&self, pid: HeapPageId) -> DbResult<HeapPage>;
    fn write_page(&self, page: &HeapPage) -> DbResult<()>;
}

struct Inner {
    cache: HashMap<HeapPageId, Arc<RwLock<HeapPage>>>,
    lock_table: LockTable,
    files: HashMap<usize, Arc<dyn PageSource>>,
}

/// Bounded page cache enforcing page-level strict two-phase locking and
/// FORCE/NO-STEAL commit semantics (§4.4). A single mutex guards the cache,
/// the lock table, and the wait-for graph together, so "check the lock, then
/// touch the cache" is always one atomic step with respect to every other
/// transaction.
pub struct BufferPool {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        BufferPool {
            capacity,
            inner: Mutex::new(Inner {
                cache: HashMap::new(),
                lock_table: LockTable::new(),
                files: HashMap::new(),
            }),
        }
    }

    pub fn get_num_pages(&self) -> usize {
        self.capacity
    }

    /// Register `source` as the page source for `file_id`; called once by a
    /// `HeapFile` as it's constructed.
    pub fn register_file(&self, file_id: usize, source: Arc<dyn PageSource>) {
        self.inner.lock().unwrap().files.insert(file_id, source);
    }

    /// Acquire `pid` under `perm` on behalf of `tid`, blocking with deadlock
    /// detection until the lock is granted, then return the cached page,
    /// reading it from disk on a cache miss.
    pub fn get_page(
        &self,
        tid: TransactionId,
        pid: HeapPageId,
        perm: Permission,
    ) -> DbResult<Arc<RwLock<HeapPage>>> {
        loop {
            let mut inner = self.inner.lock().unwrap();
            inner.lock_table.note_reference(tid, pid);

            match inner.lock_table.acquire(tid, pid, perm) {
                AcquireResult::Granted | AcquireResult::Upgrade => {
                    inner.lock_table.clear_wait_edges(tid);
                    if let Some(page) = inner.cache.get(&pid) {
                        return Ok(Arc::clone(page));
                    }
                    return self.fetch_from_disk(&mut inner, pid);
                }
                AcquireResult::MustWait(holders) => {
                    inner.lock_table.add_wait_edges(tid, &holders);
                    if inner.lock_table.has_cycle(tid) {
                        inner.lock_table.clear_wait_edges(tid);
                        warn!("deadlock detected, aborting {tid}");
                        return Err(DbError::Deadlock(tid));
                    }
                }
            }
            drop(inner);
            thread::sleep(LOCK_RETRY_INTERVAL);
        }
    }

    /// Read `pid` in from its registered source, evicting a clean page first
    /// if the cache is already at capacity. Called with `inner`'s mutex held.
    fn fetch_from_disk(&self, inner: &mut Inner, pid: HeapPageId) -> DbResult<Arc<RwLock<HeapPage>>> {
        if inner.cache.len() >= self.capacity {
            self.evict_one(inner)?;
        }
        let source = inner.files.get(&pid.file_id()).cloned().ok_or_else(|| {
            DbError::IncompatibleTypes(format!("no page source registered for file id {}", pid.file_id()))
        })?;
        let page = source.read_page(pid)?;
        let handle = Arc::new(RwLock::new(page));
        inner.cache.insert(pid, Arc::clone(&handle));
        Ok(handle)
    }

    /// NO-STEAL: evict the first clean page found; fail if every cached page
    /// is dirty, since none of them may be discarded or written out early.
    fn evict_one(&self, inner: &mut Inner) -> DbResult<()> {
        let victim = inner
            .cache
            .iter()
            .find(|(_, page)| !page.read().unwrap().is_dirty())
            .map(|(pid, _)| *pid);
        match victim {
            Some(pid) => {
                inner.cache.remove(&pid);
                Ok(())
            }
            None => Err(DbError::BufferPoolFull),
        }
    }

    /// FORCE: flush every dirty page `tid` touched to disk, then release its
    /// locks — all under one hold of the mutex, so no other transaction can
    /// acquire a page `tid` touched and mutate it between the flush and the
    /// release.
    pub fn commit_transaction(&self, tid: TransactionId) -> DbResult<()> {
        let mut inner = self.inner.lock().unwrap();
        for pid in inner.lock_table.touched_pages(tid) {
            let Some(page) = inner.cache.get(&pid).cloned() else {
                continue;
            };
            let mut page = page.write().unwrap();
            if page.is_dirty() {
                let source = inner.files.get(&pid.file_id()).cloned().ok_or_else(|| {
                    DbError::IncompatibleTypes(format!("no page source registered for file id {}", pid.file_id()))
                })?;
                source.write_page(&page)?;
                page.clear_dirty();
            }
        }
        inner.lock_table.release_all(tid);
        debug!("transaction {tid} committed");
        Ok(())
    }

    /// NO-STEAL abort: since a dirty page is never written out before
    /// commit, aborting just means discarding `tid`'s cached copies and
    /// releasing its locks — the next reader re-reads the unmodified page
    /// from its source.
    pub fn abort_transaction(&self, tid: TransactionId) {
        let mut inner = self.inner.lock().unwrap();
        let pages = inner.lock_table.release_all(tid);
        for pid in pages {
            let dirty = inner
                .cache
                .get(&pid)
                .map(|page| page.read().unwrap().is_dirty())
                .unwrap_or(false);
            if dirty {
                inner.cache.remove(&pid);
            }
        }
        warn!("transaction {tid} aborted");
    }

    /// Flush every dirty cached page regardless of owning transaction, used
    /// at shutdown or between tests, not as part of normal commit.
    pub fn flush_all_pages(&self) -> DbResult<()> {
        let inner = self.inner.lock().unwrap();
        for (pid, page) in inner.cache.iter() {
            let mut page = page.write().unwrap();
            if page.is_dirty() {
                let source = inner.files.get(&pid.file_id()).ok_or_else(|| {
                    DbError::IncompatibleTypes(format!("no page source registered for file id {}", pid.file_id()))
                })?;
                source.write_page(&page)?;
                page.clear_dirty();
            }
        }
        Ok(())
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}
