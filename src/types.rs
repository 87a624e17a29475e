use crate::config::STRING_LENGTH;
use crate::error::{DbError, DbResult};
use crate::fields::{FieldVal, IntField, StringField};

/// The closed set of field types this engine supports.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Type {
    IntType,
    StringType,
}

impl Type {
    /// Size in bytes this type occupies in a serialized tuple.
    pub fn get_len(&self) -> usize {
        match self {
            // 8 bytes, little-endian, signed
            Type::IntType => 8,
            // fixed-width, zero padded
            Type::StringType => STRING_LENGTH,
        }
    }

    /// Parse the leading `get_len()` bytes of `bytes` into a field value.
    pub fn parse(&self, bytes: &[u8]) -> DbResult<FieldVal> {
        match self {
            Type::IntType => {
                let mut int_bytes = [0u8; 8];
                int_bytes.copy_from_slice(&bytes[..8]);
                Ok(FieldVal::IntField(IntField::new(i64::from_le_bytes(
                    int_bytes,
                ))))
            }
            Type::StringType => {
                let raw = &bytes[..STRING_LENGTH];
                let end = raw.iter().position(|&b| b == 0).unwrap_or(STRING_LENGTH);
                let value = String::from_utf8(raw[..end].to_vec())
                    .map_err(|e| DbError::MalformedData(e.to_string()))?;
                Ok(FieldVal::StringField(StringField::new(value)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Field;

    #[test]
    fn int_round_trips() {
        let field = IntField::new(-42);
        let parsed = Type::IntType.parse(&field.serialize()).unwrap();
        assert_eq!(parsed, FieldVal::IntField(IntField::new(-42)));
    }

    #[test]
    fn string_strips_padding() {
        let field = StringField::new("hi".to_string());
        let parsed = Type::StringType.parse(&field.serialize()).unwrap();
        assert_eq!(
            parsed,
            FieldVal::StringField(StringField::new("hi".to_string()))
        );
    }
}
