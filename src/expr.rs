use crate::error::{DbError, DbResult};
use crate::fields::FieldVal;
use crate::tuple::Tuple;
use crate::types::Type;

/// A closed, minimal expression: a reference to one field of the input
/// tuple, carrying the name and type its evaluated value is presented under
/// by the operator that owns it. Not a general evaluator — see the
/// expressions note in the operators module.
#[derive(Debug, Clone)]
pub struct FieldExpr {
    field_index: usize,
    output_name: String,
    output_type: Type,
}

impl FieldExpr {
    pub fn new(field_index: usize, output_name: impl Into<String>, output_type: Type) -> Self {
        FieldExpr {
            field_index,
            output_name: output_name.into(),
            output_type,
        }
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn output_type(&self) -> Type {
        self.output_type
    }

    pub fn evaluate(&self, tuple: &Tuple) -> DbResult<FieldVal> {
        tuple.get_field(self.field_index).cloned().ok_or_else(|| {
            DbError::IncompatibleTypes(format!("no field at index {}", self.field_index))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::IntField;
    use crate::tuple::TupleDesc;

    #[test]
    fn evaluate_reads_the_referenced_field() {
        let td = TupleDesc::new(vec![Type::IntType], vec!["n".to_string()]);
        let tuple = Tuple::new(vec![FieldVal::IntField(IntField::new(9))], &td);
        let expr = FieldExpr::new(0, "n", Type::IntType);
        assert_eq!(expr.evaluate(&tuple).unwrap(), FieldVal::IntField(IntField::new(9)));
    }

    #[test]
    fn evaluate_out_of_range_errors() {
        let td = TupleDesc::new(vec![Type::IntType], vec!["n".to_string()]);
        let tuple = Tuple::new(vec![FieldVal::IntField(IntField::new(9))], &td);
        let expr = FieldExpr::new(5, "n", Type::IntType);
        assert!(expr.evaluate(&tuple).is_err());
    }
}
