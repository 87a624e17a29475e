pub mod delete;
pub mod insert;
pub mod join;
pub mod limit;
pub mod order_by;
pub mod project;
pub mod seq_scan;

use crate::error::DbResult;
use crate::transaction::TransactionId;
use crate::tuple::{Tuple, TupleDesc};

/// The pull-based iterator contract every operator shares (§4.5): a fixed
/// output schema plus a lazy, single-shot sequence of tuples per
/// transaction. A `None` item means end-of-stream; a `Some(Err(_))` item
/// aborts the pipeline.
pub trait Operator {
    fn descriptor(&self) -> &TupleDesc;
    fn iterator<'a>(&'a self, tid: TransactionId) -> Box<dyn Iterator<Item = DbResult<Tuple>> + 'a>;
}

/// Runs a closure exactly once to produce a single tuple, then ends. Backs
/// Insert/Delete, which consume their child fully and emit one count row.
pub(crate) struct EmitOnce<F> {
    f: Option<F>,
}

impl<F> EmitOnce<F>
where
    F: FnOnce() -> DbResult<Tuple>,
{
    pub(crate) fn new(f: F) -> Self {
        EmitOnce { f: Some(f) }
    }
}

impl<F> Iterator for EmitOnce<F>
where
    F: FnOnce() -> DbResult<Tuple>,
{
    type Item = DbResult<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        self.f.take().map(|f| f())
    }
}
