use std::collections::BTreeMap;

use standard_merkle_tree::AbiValue;

use crate::{FieldType, Result, TypedDataError, TypedDataTypes};

/// A value of some [`FieldType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    /// Static ABI value.
    Atomic(AbiValue),
    /// UTF-8 string.
    String(String),
    /// Dynamic bytes.
    Bytes(Vec<u8>),
    /// Struct members by name.
    Struct(BTreeMap<String, TypedValue>),
    /// Array elements.
    Array(Vec<TypedValue>),
}

fn invalid(path: &str, reason: impl Into<String>) -> TypedDataError {
    TypedDataError::InvalidValue {
        field: path.to_string(),
        reason: reason.into(),
    }
}

/// Scalars may be spelled as JSON strings, numbers or booleans.
fn scalar_text(path: &str, value: &serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(invalid(path, format!("expected a scalar, got {}", other))),
    }
}

impl TypedValue {
    /// Convert a JSON value into a typed value of `ty`, resolving struct
    /// references through `types`. `path` names the value in errors.
    pub fn from_json(
        types: &TypedDataTypes,
        ty: &FieldType,
        value: &serde_json::Value,
        path: &str,
    ) -> Result<Self> {
        match ty {
            FieldType::Atomic(abi) => {
                let text = scalar_text(path, value)?;
                AbiValue::parse(*abi, &text)
                    .map(TypedValue::Atomic)
                    .map_err(|e| invalid(path, e))
            }
            FieldType::String => value
                .as_str()
                .map(|s| TypedValue::String(s.to_string()))
                .ok_or_else(|| invalid(path, "expected a string")),
            FieldType::Bytes => {
                let text = value
                    .as_str()
                    .ok_or_else(|| invalid(path, "expected a hex string"))?;
                let cleaned = text.strip_prefix("0x").unwrap_or(text);
                hex::decode(cleaned)
                    .map(TypedValue::Bytes)
                    .map_err(|e| invalid(path, e.to_string()))
            }
            FieldType::Struct(name) => {
                let object = value
                    .as_object()
                    .ok_or_else(|| invalid(path, format!("expected a {} object", name)))?;
                let mut members = BTreeMap::new();
                for field in types.fields(name)? {
                    let member = object.get(&field.name).ok_or_else(|| {
                        TypedDataError::MissingField {
                            struct_name: name.clone(),
                            field: field.name.clone(),
                        }
                    })?;
                    let member_path = format!("{}.{}", path, field.name);
                    members.insert(
                        field.name.clone(),
                        TypedValue::from_json(types, &field.ty, member, &member_path)?,
                    );
                }
                Ok(TypedValue::Struct(members))
            }
            FieldType::Array(inner, len) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| invalid(path, "expected an array"))?;
                if let Some(len) = len {
                    if items.len() != *len {
                        return Err(invalid(
                            path,
                            format!("expected {} elements, got {}", len, items.len()),
                        ));
                    }
                }
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        TypedValue::from_json(types, inner, item, &format!("{}[{}]", path, i))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(TypedValue::Array)
            }
        }
    }
}
