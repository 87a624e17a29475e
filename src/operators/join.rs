use std::collections::{HashMap, VecDeque};

use crate::error::DbResult;
use crate::expr::FieldExpr;
use crate::fields::FieldVal;
use crate::operators::Operator;
use crate::transaction::TransactionId;
use crate::tuple::{Tuple, TupleDesc};

/// Equi-join on one typed key, block-nested-loop: buffers up to
/// `max_buffer_size` left tuples keyed by `left_key`, then rescans the right
/// input once per block, probing for matches. Repeats until the left input
/// is exhausted.
pub struct EqualityJoin<'o> {
    left: &'o dyn Operator,
    right: &'o dyn Operator,
    left_key: FieldExpr,
    right_key: FieldExpr,
    max_buffer_size: usize,
    descriptor: TupleDesc,
}

impl<'o> EqualityJoin<'o> {
    pub fn new(
        left: &'o dyn Operator,
        right: &'o dyn Operator,
        left_key: FieldExpr,
        right_key: FieldExpr,
        max_buffer_size: usize,
    ) -> Self {
        let descriptor = left.descriptor().merge(right.descriptor());
        EqualityJoin {
            left,
            right,
            left_key,
            right_key,
            max_buffer_size: max_buffer_size.max(1),
            descriptor,
        }
    }
}

impl<'o> Operator for EqualityJoin<'o> {
    fn descriptor(&self) -> &TupleDesc {
        &self.descriptor
    }

    fn iterator<'a>(&'a self, tid: TransactionId) -> Box<dyn Iterator<Item = DbResult<Tuple>> + 'a> {
        Box::new(EqualityJoinIter {
            join: self,
            tid,
            left_iter: self.left.iterator(tid),
            left_done: false,
            block: Vec::new(),
            buckets: HashMap::new(),
            right_iter: None,
            pending: VecDeque::new(),
        })
    }
}

struct EqualityJoinIter<'a, 'o> {
    join: &'a EqualityJoin<'o>,
    tid: TransactionId,
    left_iter: Box<dyn Iterator<Item = DbResult<Tuple>> + 'o>,
    left_done: bool,
    block: Vec<Tuple>,
    buckets: HashMap<FieldVal, Vec<usize>>,
    right_iter: Option<Box<dyn Iterator<Item = DbResult<Tuple>> + 'o>>,
    pending: VecDeque<Tuple>,
}

impl<'a, 'o> EqualityJoinIter<'a, 'o> {
    /// Load up to `max_buffer_size` left tuples into `block`/`buckets`, and
    /// open a fresh pass over the right input for this block.
    fn fill_block(&mut self) -> DbResult<bool> {
        self.block.clear();
        self.buckets.clear();
        while self.block.len() < self.join.max_buffer_size {
            match self.left_iter.next() {
                Some(Ok(tuple)) => {
                    let key = self.join.left_key.evaluate(&tuple)?;
                    let idx = self.block.len();
                    self.buckets.entry(key).or_default().push(idx);
                    self.block.push(tuple);
                }
                Some(Err(e)) => return Err(e),
                None => {
                    self.left_done = true;
                    break;
                }
            }
        }
        self.right_iter = Some(self.join.right.iterator(self.tid));
        Ok(!self.block.is_empty())
    }

    fn advance(&mut self) -> DbResult<Option<Tuple>> {
        loop {
            if let Some(t) = self.pending.pop_front() {
                return Ok(Some(t));
            }

            let Some(right_iter) = self.right_iter.as_mut() else {
                if self.left_done || !self.fill_block()? {
                    return Ok(None);
                }
                continue;
            };

            match right_iter.next() {
                Some(Ok(right_tuple)) => {
                    let key = self.join.right_key.evaluate(&right_tuple)?;
                    if let Some(indices) = self.buckets.get(&key) {
                        for &i in indices {
                            self.pending
                                .push_back(Tuple::join(&self.block[i], &right_tuple));
                        }
                    }
                }
                Some(Err(e)) => return Err(e),
                None => {
                    self.right_iter = None;
                    if self.left_done {
                        return Ok(None);
                    }
                }
            }
        }
    }
}

impl<'a, 'o> Iterator for EqualityJoinIter<'a, 'o> {
    type Item = DbResult<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}
