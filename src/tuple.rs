use std::fmt::{Display, Formatter};

use crate::error::{DbError, DbResult};
use crate::fields::FieldVal;
use crate::heap_page::HeapPageId;
use crate::types::Type;

/// Reference to a tuple on a page of a table: (page, slot).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct RecordId {
    pid: HeapPageId,
    slot_index: usize,
}

impl RecordId {
    pub fn new(pid: HeapPageId, slot_index: usize) -> Self {
        RecordId { pid, slot_index }
    }

    pub fn page_id(&self) -> HeapPageId {
        self.pid
    }

    pub fn slot_index(&self) -> usize {
        self.slot_index
    }
}

/// One field's schema: its name, an optional table qualifier, and its type.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FieldSchema {
    pub name: String,
    pub qualifier: Option<String>,
    pub ftype: Type,
}

/// The schema of a tuple or table: an ordered sequence of named, typed
/// fields. Equality is field-wise and positional.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TupleDesc {
    fields: Vec<FieldSchema>,
}

impl TupleDesc {
    /// Construct a descriptor with no table qualifiers.
    pub fn new(types: Vec<Type>, names: Vec<String>) -> Self {
        Self::with_qualifiers(types, names, vec![None; 0])
    }

    /// Construct a descriptor with an explicit, possibly-absent, qualifier
    /// per field. `qualifiers` may be shorter than `types`/`names`, in which
    /// case the remaining fields get no qualifier.
    pub fn with_qualifiers(
        types: Vec<Type>,
        names: Vec<String>,
        mut qualifiers: Vec<Option<String>>,
    ) -> Self {
        qualifiers.resize(names.len(), None);
        let fields = types
            .into_iter()
            .zip(names)
            .zip(qualifiers)
            .map(|((ftype, name), qualifier)| FieldSchema {
                name,
                qualifier,
                ftype,
            })
            .collect();
        TupleDesc { fields }
    }

    /// Concatenate two descriptors: `self`'s fields followed by `other`'s.
    pub fn merge(&self, other: &TupleDesc) -> TupleDesc {
        let mut fields = self.fields.clone();
        fields.extend(other.fields.clone());
        TupleDesc { fields }
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field_name(&self, i: usize) -> Option<&str> {
        self.fields.get(i).map(|f| f.name.as_str())
    }

    pub fn field_type(&self, i: usize) -> Option<Type> {
        self.fields.get(i).map(|f| f.ftype)
    }

    pub fn field_qualifier(&self, i: usize) -> Option<&str> {
        self.fields.get(i).and_then(|f| f.qualifier.as_deref())
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Find the index of the field named `name`, preferring one qualified by
    /// `qualifier` when given. An unqualified lookup that matches more than
    /// one field is ambiguous.
    pub fn find_field(&self, name: &str, qualifier: Option<&str>) -> DbResult<usize> {
        let mut best: Option<usize> = None;
        for (i, field) in self.fields.iter().enumerate() {
            if field.name != name {
                continue;
            }
            if qualifier.is_none() && best.is_some() {
                return Err(DbError::AmbiguousName(name.to_string()));
            }
            if qualifier.is_none() || field.qualifier.as_deref() == qualifier || best.is_none() {
                best = Some(i);
            }
        }
        best.ok_or_else(|| DbError::IncompatibleTypes(format!("field not found: {name}")))
    }

    /// Total size, in bytes, of a serialized tuple conforming to this schema.
    pub fn get_size(&self) -> usize {
        self.fields.iter().map(|f| f.ftype.get_len()).sum()
    }
}

/// A record: a schema plus a value per field, plus an optional record-id
/// (absent until the tuple has been read from or written to a page).
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Tuple {
    fields: Vec<FieldVal>,
    td: TupleDesc,
    rid: Option<RecordId>,
}

impl Display for Tuple {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut s = String::new();
        for (i, field) in self.fields.iter().enumerate() {
            match field {
                FieldVal::IntField(int_field) => {
                    s.push_str(&format!("{}: {}", self.td.fields[i].name, int_field.get_value()))
                }
                FieldVal::StringField(string_field) => s.push_str(&format!(
                    "{}: {}",
                    self.td.fields[i].name,
                    string_field.get_value()
                )),
            }
            if i != self.fields.len() - 1 {
                s.push_str(", ");
            }
        }
        write!(f, "{{{}}}", s)
    }
}

impl Tuple {
    pub fn new(fields: Vec<FieldVal>, td: &TupleDesc) -> Self {
        Tuple {
            fields,
            td: td.clone(),
            rid: None,
        }
    }

    pub fn tuple_desc(&self) -> &TupleDesc {
        &self.td
    }

    pub fn get_record_id(&self) -> Option<RecordId> {
        self.rid
    }

    pub fn set_record_id(&mut self, rid: RecordId) {
        self.rid = Some(rid);
    }

    pub fn get_field(&self, i: usize) -> Option<&FieldVal> {
        self.fields.get(i)
    }

    pub fn set_field(&mut self, i: usize, field: FieldVal) {
        self.fields[i] = field;
    }

    pub fn fields(&self) -> &[FieldVal] {
        &self.fields
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = vec![];
        for field in self.fields.iter() {
            bytes.extend(field.serialize());
        }
        bytes
    }

    pub fn deserialize(bytes: &[u8], td: &TupleDesc) -> DbResult<Self> {
        let mut offset = 0;
        let mut fields = vec![];
        for field_schema in td.fields.iter() {
            let field = field_schema.ftype.parse(&bytes[offset..])?;
            offset += field_schema.ftype.get_len();
            fields.push(field);
        }
        Ok(Tuple::new(fields, td))
    }

    /// Concatenate two tuples' fields under a merged descriptor. Used by
    /// equality join to produce the combined output row.
    pub fn join(left: &Tuple, right: &Tuple) -> Tuple {
        let td = left.td.merge(&right.td);
        let fields = left
            .fields
            .iter()
            .chain(right.fields.iter())
            .cloned()
            .collect();
        Tuple::new(fields, &td)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{IntField, StringField};
    use crate::types::Type;

    #[test]
    fn test_tuple_desc_merge() {
        let td1 = TupleDesc::new(
            vec![Type::IntType, Type::StringType],
            vec!["int".to_string(), "string".to_string()],
        );
        let td2 = td1.clone();
        let td3 = td1.merge(&td2);
        assert_eq!(td3.num_fields(), 4);
        assert_eq!(td3.field_name(0), Some("int"));
        assert_eq!(td3.field_name(2), Some("int"));
    }

    #[test]
    fn test_tuple_desc_len() {
        let td = TupleDesc::new(
            vec![Type::IntType, Type::StringType],
            vec!["int".to_string(), "string".to_string()],
        );
        assert_eq!(
            td.get_size(),
            Type::IntType.get_len() + Type::StringType.get_len()
        );
    }

    #[test]
    fn test_tuple_serialize_deserialize() {
        let td = TupleDesc::new(
            vec![Type::IntType, Type::StringType],
            vec!["int".to_string(), "string".to_string()],
        );
        let tuple = Tuple::new(
            vec![
                FieldVal::IntField(IntField::new(1)),
                FieldVal::StringField(StringField::new("hello".to_string())),
            ],
            &td,
        );
        let bytes = tuple.serialize();
        let tuple2 = Tuple::deserialize(&bytes, &td).unwrap();
        assert_eq!(tuple, tuple2);
    }

    #[test]
    fn find_field_prefers_qualifier() {
        let td = TupleDesc::with_qualifiers(
            vec![Type::IntType, Type::IntType],
            vec!["id".to_string(), "id".to_string()],
            vec![Some("a".to_string()), Some("b".to_string())],
        );
        assert_eq!(td.find_field("id", Some("b")).unwrap(), 1);
    }

    #[test]
    fn find_field_ambiguous_without_qualifier() {
        let td = TupleDesc::with_qualifiers(
            vec![Type::IntType, Type::IntType],
            vec!["id".to_string(), "id".to_string()],
            vec![Some("a".to_string()), Some("b".to_string())],
        );
        assert!(matches!(
            td.find_field("id", None),
            Err(DbError::AmbiguousName(_))
        ));
    }

    #[test]
    fn join_concatenates_fields() {
        let td = TupleDesc::new(vec![Type::IntType], vec!["n".to_string()]);
        let a = Tuple::new(vec![FieldVal::IntField(IntField::new(1))], &td);
        let b = Tuple::new(vec![FieldVal::IntField(IntField::new(2))], &td);
        let joined = Tuple::join(&a, &b);
        assert_eq!(joined.tuple_desc().num_fields(), 2);
        assert_eq!(joined.get_field(0), Some(&FieldVal::IntField(IntField::new(1))));
        assert_eq!(joined.get_field(1), Some(&FieldVal::IntField(IntField::new(2))));
    }
}
