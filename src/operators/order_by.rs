use std::cmp::Ordering;

use crate::error::DbResult;
use crate::expr::FieldExpr;
use crate::operators::Operator;
use crate::transaction::TransactionId;
use crate::tuple::{Tuple, TupleDesc};

/// One sort key: the field to compare by and whether it sorts ascending.
pub struct OrderByKey {
    pub expr: FieldExpr,
    pub ascending: bool,
}

/// Blocking sort: consumes the child fully, sorts by the key expressions
/// with typed lexicographic comparison, then yields in order. Ties among all
/// keys preserve the child's original relative order (a stable sort).
pub struct OrderBy<'o> {
    child: &'o dyn Operator,
    keys: Vec<OrderByKey>,
}

impl<'o> OrderBy<'o> {
    pub fn new(child: &'o dyn Operator, keys: Vec<OrderByKey>) -> Self {
        OrderBy { child, keys }
    }
}

impl<'o> Operator for OrderBy<'o> {
    fn descriptor(&self) -> &TupleDesc {
        self.child.descriptor()
    }

    fn iterator<'a>(&'a self, tid: TransactionId) -> Box<dyn Iterator<Item = DbResult<Tuple>> + 'a> {
        let mut buffered = Vec::new();
        for item in self.child.iterator(tid) {
            match item {
                Ok(t) => buffered.push(t),
                Err(e) => return Box::new(std::iter::once(Err(e))),
            }
        }

        let mut eval_error = None;
        buffered.sort_by(|a, b| {
            if eval_error.is_some() {
                return Ordering::Equal;
            }
            for key in &self.keys {
                let (av, bv) = match (key.expr.evaluate(a), key.expr.evaluate(b)) {
                    (Ok(av), Ok(bv)) => (av, bv),
                    (Err(e), _) | (_, Err(e)) => {
                        eval_error = Some(e);
                        return Ordering::Equal;
                    }
                };
                let ord = av.partial_cmp(&bv).unwrap_or(Ordering::Equal);
                let ord = if key.ascending { ord } else { ord.reverse() };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        if let Some(e) = eval_error {
            return Box::new(std::iter::once(Err(e)));
        }
        Box::new(buffered.into_iter().map(Ok))
    }
}
