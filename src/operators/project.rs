use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::DbResult;
use crate::expr::FieldExpr;
use crate::operators::Operator;
use crate::transaction::TransactionId;
use crate::tuple::{Tuple, TupleDesc};

/// Evaluates a fixed list of field expressions against each child tuple. If
/// `distinct`, tracks a structural hash of every emitted tuple and skips
/// repeats.
pub struct Project<'o> {
    child: &'o dyn Operator,
    exprs: Vec<FieldExpr>,
    descriptor: TupleDesc,
    distinct: bool,
}

impl<'o> Project<'o> {
    pub fn new(child: &'o dyn Operator, exprs: Vec<FieldExpr>, distinct: bool) -> Self {
        let types = exprs.iter().map(|e| e.output_type()).collect();
        let names = exprs.iter().map(|e| e.output_name().to_string()).collect();
        Project {
            child,
            exprs,
            descriptor: TupleDesc::new(types, names),
            distinct,
        }
    }
}

impl<'o> Operator for Project<'o> {
    fn descriptor(&self) -> &TupleDesc {
        &self.descriptor
    }

    fn iterator<'a>(&'a self, tid: TransactionId) -> Box<dyn Iterator<Item = DbResult<Tuple>> + 'a> {
        Box::new(ProjectIter {
            inner: self.child.iterator(tid),
            project: self,
            seen: HashSet::new(),
        })
    }
}

struct ProjectIter<'a, 'o> {
    inner: Box<dyn Iterator<Item = DbResult<Tuple>> + 'a>,
    project: &'a Project<'o>,
    seen: HashSet<u64>,
}

impl<'a, 'o> Iterator for ProjectIter<'a, 'o> {
    type Item = DbResult<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let tuple = match self.inner.next()? {
                Ok(t) => t,
                Err(e) => return Some(Err(e)),
            };
            let fields: DbResult<Vec<_>> = self
                .project
                .exprs
                .iter()
                .map(|e| e.evaluate(&tuple))
                .collect();
            let fields = match fields {
                Ok(f) => f,
                Err(e) => return Some(Err(e)),
            };
            let out = Tuple::new(fields, &self.project.descriptor);

            if self.project.distinct {
                let mut hasher = DefaultHasher::new();
                out.fields().hash(&mut hasher);
                if !self.seen.insert(hasher.finish()) {
                    continue;
                }
            }
            return Some(Ok(out));
        }
    }
}
