use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::buffer_pool::{BufferPool, PageSource};
use crate::config::PAGE_SIZE;
use crate::error::{DbError, DbResult};
use crate::heap_page::{HeapPage, HeapPageId, Permission};
use crate::transaction::TransactionId;
use crate::tuple::{Tuple, TupleDesc};

/// A table's on-disk representation: a flat file of fixed-size pages, all
/// sharing one schema, plus the buffer pool it routes every page access
/// through.
pub struct HeapFile {
    file: Mutex<File>,
    td: TupleDesc,
    id: usize,
    bp: Arc<BufferPool>,
}

impl HeapFile {
    /// Construct a `HeapFile` backed by `file` and register it with `bp` as
    /// the page source for its file id.
    pub fn new(file: File, td: TupleDesc, bp: Arc<BufferPool>) -> Arc<Self> {
        let heap_file = Arc::new(HeapFile {
            file: Mutex::new(file),
            td,
            id: Uuid::new_v4().as_u128() as usize,
            bp: Arc::clone(&bp),
        });
        bp.register_file(heap_file.id, Arc::clone(&heap_file) as Arc<dyn PageSource>);
        heap_file
    }

    pub fn get_id(&self) -> usize {
        self.id
    }

    pub fn get_tuple_desc(&self) -> &TupleDesc {
        &self.td
    }

    pub fn num_pages(&self) -> DbResult<usize> {
        let file = self.file.lock().unwrap();
        Ok((file.metadata()?.len() as usize).div_ceil(PAGE_SIZE))
    }

    /// Insert `tuple`, scanning existing pages in order for one with a free
    /// slot before extending the file with a fresh page. Every scanned page
    /// is taken under a write lock, not a shared one later upgraded — two
    /// transactions scanning the same under-full page this way contend for
    /// the same lock instead of each granting the other a shared hold and
    /// then deadlocking on a simultaneous upgrade.
    pub fn insert_tuple(&self, tid: TransactionId, tuple: Tuple) -> DbResult<()> {
        let table_id = self.id;
        let mut page_no = 0;

        loop {
            let pid = HeapPageId::new(table_id, page_no);
            let existing_pages = self.num_pages()?;
            let page = self.bp.get_page(tid, pid, Permission::Write)?;
            let mut page = page.write().unwrap();
            if page.num_empty_slots() > 0 {
                page.insert_tuple(tuple)?;
                page.mark_dirty(true, tid);
                return Ok(());
            }
            drop(page);
            if page_no + 1 >= existing_pages {
                let pid = HeapPageId::new(table_id, existing_pages);
                let page = self.bp.get_page(tid, pid, Permission::Write)?;
                let mut page = page.write().unwrap();
                page.insert_tuple(tuple)?;
                page.mark_dirty(true, tid);
                return Ok(());
            }
            page_no += 1;
        }
    }

    /// Delete `tuple`, which must carry a record-id from a previous read.
    pub fn delete_tuple(&self, tid: TransactionId, tuple: &Tuple) -> DbResult<()> {
        let rid = tuple
            .get_record_id()
            .ok_or_else(|| DbError::IncompatibleTypes("tuple has no record id to delete".to_string()))?;
        let page = self.bp.get_page(tid, rid.page_id(), Permission::Write)?;
        let mut page = page.write().unwrap();
        page.delete_tuple(rid)?;
        page.mark_dirty(true, tid);
        Ok(())
    }

    /// A lazy, single-shot iterator over every live tuple in the file, each
    /// page read-locked through the buffer pool in turn.
    pub fn iterator(&self, tid: TransactionId) -> HeapFileIter<'_> {
        HeapFileIter {
            heap_file: self,
            tid,
            page_no: 0,
            buffer: Vec::new().into_iter(),
        }
    }
}

impl PageSource for HeapFile {
    /// Read page `pid` in from disk, zero-extending the file first if it is
    /// shorter than `pid` requires — a page past the current end of file
    /// reads back as freshly empty.
    fn read_page(&self, pid: HeapPageId) -> DbResult<HeapPage> {
        let mut file = self.file.lock().unwrap();
        let page_no = pid.page_number();
        let mut len_pages = (file.metadata()?.len() as usize).div_ceil(PAGE_SIZE);
        while len_pages <= page_no {
            file.seek(SeekFrom::Start((len_pages * PAGE_SIZE) as u64))?;
            file.write_all(&vec![0u8; PAGE_SIZE])?;
            len_pages += 1;
        }
        let mut data = vec![0u8; PAGE_SIZE];
        file.seek(SeekFrom::Start((page_no * PAGE_SIZE) as u64))?;
        file.read_exact(&mut data)?;
        HeapPage::deserialize(pid, &data, self.td.clone())
    }

    fn write_page(&self, page: &HeapPage) -> DbResult<()> {
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start(
            (page.get_id().page_number() * PAGE_SIZE) as u64,
        ))?;
        file.write_all(&page.serialize())?;
        Ok(())
    }
}

pub struct HeapFileIter<'a> {
    heap_file: &'a HeapFile,
    tid: TransactionId,
    page_no: usize,
    buffer: std::vec::IntoIter<Tuple>,
}

impl HeapFileIter<'_> {
    fn load_next_page(&mut self) -> DbResult<bool> {
        let total = self.heap_file.num_pages()?;
        while self.page_no < total {
            let pid = HeapPageId::new(self.heap_file.get_id(), self.page_no);
            self.page_no += 1;
            let page = self.heap_file.bp.get_page(self.tid, pid, Permission::Read)?;
            let tuples: Vec<Tuple> = page.read().unwrap().iter().cloned().collect();
            if !tuples.is_empty() {
                self.buffer = tuples.into_iter();
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Iterator for HeapFileIter<'_> {
    type Item = DbResult<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tuple) = self.buffer.next() {
                return Some(Ok(tuple));
            }
            match self.load_next_page() {
                Ok(true) => continue,
                Ok(false) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
