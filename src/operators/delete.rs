use std::sync::Arc;

use crate::error::DbResult;
use crate::fields::{FieldVal, IntField};
use crate::heap_file::HeapFile;
use crate::operators::{EmitOnce, Operator};
use crate::transaction::TransactionId;
use crate::tuple::{Tuple, TupleDesc};
use crate::types::Type;

/// Consumes its child fully, deleting each tuple (by its own record-id) from
/// `table` under the transaction, then emits a single `count` tuple and ends.
pub struct Delete<'o> {
    child: &'o dyn Operator,
    table: Arc<HeapFile>,
    descriptor: TupleDesc,
}

impl<'o> Delete<'o> {
    pub fn new(child: &'o dyn Operator, table: Arc<HeapFile>) -> Self {
        Delete {
            child,
            table,
            descriptor: TupleDesc::new(vec![Type::IntType], vec!["count".to_string()]),
        }
    }
}

impl<'o> Operator for Delete<'o> {
    fn descriptor(&self) -> &TupleDesc {
        &self.descriptor
    }

    fn iterator<'a>(&'a self, tid: TransactionId) -> Box<dyn Iterator<Item = DbResult<Tuple>> + 'a> {
        Box::new(EmitOnce::new(move || {
            let mut count = 0i64;
            for item in self.child.iterator(tid) {
                let tuple = item?;
                self.table.delete_tuple(tid, &tuple)?;
                count += 1;
            }
            Ok(Tuple::new(
                vec![FieldVal::IntField(IntField::new(count))],
                &self.descriptor,
            ))
        }))
    }
}
