use std::sync::Arc;

use crate::error::DbResult;
use crate::heap_file::HeapFile;
use crate::operators::Operator;
use crate::transaction::TransactionId;
use crate::tuple::{Tuple, TupleDesc};

/// Yields every live tuple of a table in page, slot order, stamped with its
/// record-id. A thin wrapper around `HeapFile::iterator` so a table can
/// participate as an `Operator` in a pipeline.
pub struct SeqScan {
    table: Arc<HeapFile>,
}

impl SeqScan {
    pub fn new(table: Arc<HeapFile>) -> Self {
        SeqScan { table }
    }
}

impl Operator for SeqScan {
    fn descriptor(&self) -> &TupleDesc {
        self.table.get_tuple_desc()
    }

    fn iterator<'a>(&'a self, tid: TransactionId) -> Box<dyn Iterator<Item = DbResult<Tuple>> + 'a> {
        Box::new(self.table.iterator(tid))
    }
}
