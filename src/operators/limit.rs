use crate::error::DbResult;
use crate::operators::Operator;
use crate::transaction::TransactionId;
use crate::tuple::{Tuple, TupleDesc};

/// Yields the child's first `n` tuples, then ends — `n` is fixed at
/// construction (the spec's "evaluated once against a nil context").
pub struct Limit<'o> {
    child: &'o dyn Operator,
    n: usize,
}

impl<'o> Limit<'o> {
    pub fn new(child: &'o dyn Operator, n: usize) -> Self {
        Limit { child, n }
    }
}

impl<'o> Operator for Limit<'o> {
    fn descriptor(&self) -> &TupleDesc {
        self.child.descriptor()
    }

    fn iterator<'a>(&'a self, tid: TransactionId) -> Box<dyn Iterator<Item = DbResult<Tuple>> + 'a> {
        Box::new(self.child.iterator(tid).take(self.n))
    }
}
