use crate::config::STRING_LENGTH;
use crate::types::Type;

/// Wrapper for the two concrete field kinds this engine supports.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum FieldVal {
    IntField(IntField),
    StringField(StringField),
}

impl FieldVal {
    /// Extracts the inner IntField
    pub fn into_int(self) -> Option<IntField> {
        match self {
            FieldVal::IntField(int_field) => Some(int_field),
            _ => None,
        }
    }
    /// Extracts the inner StringField
    pub fn into_string(self) -> Option<StringField> {
        match self {
            FieldVal::StringField(string_field) => Some(string_field),
            _ => None,
        }
    }

    pub fn get_type(&self) -> Type {
        match self {
            FieldVal::IntField(_) => Type::IntType,
            FieldVal::StringField(_) => Type::StringType,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            FieldVal::IntField(f) => f.serialize(),
            FieldVal::StringField(f) => f.serialize(),
        }
    }
}

impl PartialOrd for FieldVal {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (FieldVal::IntField(a), FieldVal::IntField(b)) => a.value.partial_cmp(&b.value),
            (FieldVal::StringField(a), FieldVal::StringField(b)) => {
                a.value.as_bytes().partial_cmp(b.value.as_bytes())
            }
            _ => None,
        }
    }
}

/// Trait for different types of fields
pub trait Field {
    /// Get the type of the field
    fn get_type(&self) -> Type;
    /// Serialize the field into bytes
    fn serialize(&self) -> Vec<u8>;
}

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct IntField {
    value: i64,
}

impl IntField {
    pub fn new(value: i64) -> Self {
        IntField { value }
    }
    pub fn get_value(&self) -> i64 {
        self.value
    }
}

impl Field for IntField {
    fn get_type(&self) -> Type {
        Type::IntType
    }
    fn serialize(&self) -> Vec<u8> {
        self.value.to_le_bytes().to_vec()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct StringField {
    value: String,
}

impl StringField {
    /// Construct a field, truncating `value` to at most `STRING_LENGTH`
    /// bytes if necessary (the on-disk representation can never hold more).
    /// Truncates at the last char boundary at or before `STRING_LENGTH`,
    /// since `STRING_LENGTH` itself may fall in the middle of a multi-byte
    /// character.
    pub fn new(value: String) -> Self {
        let mut truncated = value;
        if truncated.len() > STRING_LENGTH {
            let mut cut = STRING_LENGTH;
            while !truncated.is_char_boundary(cut) {
                cut -= 1;
            }
            truncated.truncate(cut);
        }
        StringField { value: truncated }
    }

    pub fn get_value(&self) -> String {
        self.value.clone()
    }
}

impl Field for StringField {
    fn get_type(&self) -> Type {
        Type::StringType
    }

    fn serialize(&self) -> Vec<u8> {
        let mut bytes = vec![0; STRING_LENGTH];
        let str_bytes = self.value.as_bytes();
        let copy_len = std::cmp::min(str_bytes.len(), STRING_LENGTH);
        bytes[..copy_len].copy_from_slice(&str_bytes[..copy_len]);
        bytes
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_int_field() {
        let int_field = IntField::new(1);
        assert_eq!(int_field.get_type(), Type::IntType);
        assert_eq!(int_field.serialize(), 1i64.to_le_bytes().to_vec());
    }

    #[test]
    fn test_string_field() {
        let string_field = StringField::new("hello".to_string());
        assert_eq!(string_field.get_type(), Type::StringType);
        let mut serialized = vec![0u8; STRING_LENGTH];
        serialized[..5].copy_from_slice("hello".as_bytes());
        assert_eq!(string_field.serialize(), serialized);
    }

    #[test]
    fn test_string_field_truncates() {
        let long = "x".repeat(STRING_LENGTH + 10);
        let field = StringField::new(long);
        assert_eq!(field.get_value().len(), STRING_LENGTH);
    }

    #[test]
    fn truncates_on_a_char_boundary() {
        // Two-byte characters filling up to and past STRING_LENGTH: the
        // STRING_LENGTH-th byte lands in the middle of one of them.
        let long = "é".repeat(STRING_LENGTH);
        let field = StringField::new(long);
        assert!(field.get_value().len() <= STRING_LENGTH);
    }
}
