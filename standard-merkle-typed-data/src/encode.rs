//! Struct hashing.
//!
//! `hash_struct(s) = keccak256(type_hash(S) || encode_data(s))`, where each
//! member contributes one 32-byte word:
//!
//! - atomic values: their ABI word
//! - `string` / `bytes`: keccak of the contents
//! - structs: their struct hash
//! - arrays: keccak of the concatenated element words

use standard_merkle_tree::{Hash, keccak256};

use crate::{FieldType, Result, TypedDataError, TypedDataTypes, TypedValue};

fn mismatch(ty: &FieldType) -> TypedDataError {
    TypedDataError::InvalidValue {
        field: ty.to_string(),
        reason: "value does not match the declared type".to_string(),
    }
}

impl TypedDataTypes {
    /// `type_hash(primary) || member words`, without the final hash.
    pub fn encode_data(&self, primary: &str, value: &TypedValue) -> Result<Vec<u8>> {
        let TypedValue::Struct(members) = value else {
            return Err(mismatch(&FieldType::Struct(primary.to_string())));
        };
        let fields = self.fields(primary)?;
        let mut out = Vec::with_capacity(32 * (fields.len() + 1));
        out.extend_from_slice(&self.type_hash(primary)?);
        for field in fields {
            let member = members
                .get(&field.name)
                .ok_or_else(|| TypedDataError::MissingField {
                    struct_name: primary.to_string(),
                    field: field.name.clone(),
                })?;
            out.extend_from_slice(&self.encode_field(&field.ty, member)?);
        }
        Ok(out)
    }

    /// Struct hash of `value` as an instance of `primary`.
    pub fn hash_struct(&self, primary: &str, value: &TypedValue) -> Result<Hash> {
        Ok(keccak256(self.encode_data(primary, value)?))
    }

    /// Parse `json` as an instance of `primary` and hash it.
    pub fn hash_struct_json(&self, primary: &str, json: &serde_json::Value) -> Result<Hash> {
        let value = TypedValue::from_json(
            self,
            &FieldType::Struct(primary.to_string()),
            json,
            primary,
        )?;
        self.hash_struct(primary, &value)
    }

    fn encode_field(&self, ty: &FieldType, value: &TypedValue) -> Result<[u8; 32]> {
        match (ty, value) {
            (FieldType::Atomic(abi), TypedValue::Atomic(v)) => {
                v.check(*abi).map_err(|reason| TypedDataError::InvalidValue {
                    field: ty.to_string(),
                    reason,
                })?;
                Ok(v.abi_word())
            }
            (FieldType::String, TypedValue::String(s)) => Ok(keccak256(s.as_bytes())),
            (FieldType::Bytes, TypedValue::Bytes(b)) => Ok(keccak256(b)),
            (FieldType::Struct(name), v @ TypedValue::Struct(_)) => self.hash_struct(name, v),
            (FieldType::Array(inner, len), TypedValue::Array(items)) => {
                if len.is_some_and(|len| len != items.len()) {
                    return Err(mismatch(ty));
                }
                let mut buf = Vec::with_capacity(32 * items.len());
                for item in items {
                    buf.extend_from_slice(&self.encode_field(inner, item)?);
                }
                Ok(keccak256(buf))
            }
            _ => Err(mismatch(ty)),
        }
    }
}
