use log::debug;
use serde::Deserialize;
use standard_merkle_tree::Hash;

use crate::{
    Eip712Domain, Result, TypedDataError, TypedDataTypes, domain::DOMAIN_TYPE, signing_hash,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypedData {
    types: serde_json::Map<String, serde_json::Value>,
    primary_type: String,
    #[serde(default)]
    domain: Option<serde_json::Value>,
    message: serde_json::Value,
}

/// A complete typed-data document: schemas, the primary type, an optional
/// signing domain and the message.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedData {
    /// Struct schemas, without the domain struct.
    pub types: TypedDataTypes,
    /// Name of the struct `message` is an instance of.
    pub primary_type: String,
    /// Signing domain, if any.
    pub domain: Option<Eip712Domain>,
    /// The message as JSON.
    pub message: serde_json::Value,
}

impl TypedData {
    /// Parse `{"types": .., "primaryType": .., "domain": .., "message": ..}`.
    ///
    /// An `EIP712Domain` entry in `types` is ignored; the domain type is
    /// derived from the fields present in `domain`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let raw: RawTypedData = serde_json::from_value(value.clone())
            .map_err(|e| TypedDataError::InvalidSchema(e.to_string()))?;
        let mut schemas = raw.types;
        schemas.remove(DOMAIN_TYPE);
        let types = TypedDataTypes::from_json(&serde_json::Value::Object(schemas))?;
        if !types.contains(&raw.primary_type) {
            return Err(TypedDataError::UnknownType(raw.primary_type));
        }
        let domain = match raw.domain {
            None | Some(serde_json::Value::Null) => None,
            Some(domain) => Some(Eip712Domain::from_json(&domain)?),
        };
        Ok(Self {
            types,
            primary_type: raw.primary_type,
            domain,
            message: raw.message,
        })
    }

    /// Parse a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| TypedDataError::InvalidSchema(e.to_string()))?;
        Self::from_json(&value)
    }

    /// Struct hash of the message.
    pub fn struct_hash(&self) -> Result<Hash> {
        let hash = self
            .types
            .hash_struct_json(&self.primary_type, &self.message)?;
        debug!("hashed {} message", self.primary_type);
        Ok(hash)
    }

    /// Domain separator, when a domain is present.
    pub fn domain_separator(&self) -> Result<Option<Hash>> {
        self.domain.as_ref().map(Eip712Domain::separator).transpose()
    }

    /// Digest to sign, when a domain is present.
    pub fn signing_hash(&self) -> Result<Option<Hash>> {
        match self.domain_separator()? {
            Some(separator) => Ok(Some(signing_hash(&separator, &self.struct_hash()?))),
            None => Ok(None),
        }
    }
}
