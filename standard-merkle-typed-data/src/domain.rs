use std::collections::BTreeMap;

use alloy_primitives::U256;
use standard_merkle_tree::{AbiType, AbiValue, Hash, keccak256};

use crate::{FieldType, Result, TypedDataError, TypedDataTypes, TypedField, TypedValue};

/// Name of the domain struct.
pub const DOMAIN_TYPE: &str = "EIP712Domain";

/// Signing domain. Only the fields that are set take part in the domain
/// type, in the fixed order name, version, chainId, verifyingContract, salt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eip712Domain {
    /// Human-readable signing domain name.
    pub name: Option<String>,
    /// Major version of the signing domain.
    pub version: Option<String>,
    /// Chain id.
    pub chain_id: Option<U256>,
    /// Contract that will verify the signature.
    pub verifying_contract: Option<[u8; 20]>,
    /// Disambiguating salt.
    pub salt: Option<Hash>,
}

impl Eip712Domain {
    fn typed(&self) -> (TypedDataTypes, TypedValue) {
        let mut fields = Vec::new();
        let mut members = BTreeMap::new();
        let mut push = |name: &str, ty: FieldType, value: TypedValue| {
            fields.push(TypedField {
                name: name.to_string(),
                ty,
            });
            members.insert(name.to_string(), value);
        };
        if let Some(name) = &self.name {
            push("name", FieldType::String, TypedValue::String(name.clone()));
        }
        if let Some(version) = &self.version {
            push(
                "version",
                FieldType::String,
                TypedValue::String(version.clone()),
            );
        }
        if let Some(chain_id) = self.chain_id {
            push(
                "chainId",
                FieldType::Atomic(AbiType::Uint(256)),
                TypedValue::Atomic(AbiValue::Uint(chain_id)),
            );
        }
        if let Some(contract) = self.verifying_contract {
            push(
                "verifyingContract",
                FieldType::Atomic(AbiType::Address),
                TypedValue::Atomic(AbiValue::Address(contract)),
            );
        }
        if let Some(salt) = self.salt {
            push(
                "salt",
                FieldType::Atomic(AbiType::FixedBytes(32)),
                TypedValue::Atomic(AbiValue::FixedBytes(salt.to_vec())),
            );
        }
        let types = TypedDataTypes::from_fields(DOMAIN_TYPE, fields);
        (types, TypedValue::Struct(members))
    }

    /// `encode_type` of the domain struct for the fields that are set.
    pub fn encode_type(&self) -> Result<String> {
        self.typed().0.encode_type(DOMAIN_TYPE)
    }

    /// The domain separator: struct hash of the domain.
    pub fn separator(&self) -> Result<Hash> {
        let (types, value) = self.typed();
        types.hash_struct(DOMAIN_TYPE, &value)
    }

    /// Parse a JSON object with any of `name`, `version`, `chainId`,
    /// `verifyingContract`, `salt`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| TypedDataError::InvalidSchema("domain must be an object".into()))?;
        let text = |key: &str| -> Result<Option<String>> {
            match object.get(key) {
                None | Some(serde_json::Value::Null) => Ok(None),
                Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
                Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
                Some(other) => Err(TypedDataError::InvalidValue {
                    field: format!("{}.{}", DOMAIN_TYPE, key),
                    reason: format!("unexpected {}", other),
                }),
            }
        };
        let atomic = |key: &str, ty: AbiType| -> Result<Option<AbiValue>> {
            text(key)?
                .map(|raw| {
                    AbiValue::parse(ty, &raw).map_err(|reason| TypedDataError::InvalidValue {
                        field: format!("{}.{}", DOMAIN_TYPE, key),
                        reason,
                    })
                })
                .transpose()
        };

        let chain_id = match atomic("chainId", AbiType::Uint(256))? {
            Some(AbiValue::Uint(v)) => Some(v),
            _ => None,
        };
        let verifying_contract = match atomic("verifyingContract", AbiType::Address)? {
            Some(AbiValue::Address(a)) => Some(a),
            _ => None,
        };
        let salt = match atomic("salt", AbiType::FixedBytes(32))? {
            Some(v) => Some(v.abi_word()),
            None => None,
        };
        Ok(Self {
            name: text("name")?,
            version: text("version")?,
            chain_id,
            verifying_contract,
            salt,
        })
    }
}

/// Digest a wallet signs: `keccak256(0x19 || 0x01 || separator || struct_hash)`.
pub fn signing_hash(domain_separator: &Hash, struct_hash: &Hash) -> Hash {
    let mut buf = [0u8; 66];
    buf[0] = 0x19;
    buf[1] = 0x01;
    buf[2..34].copy_from_slice(domain_separator);
    buf[34..].copy_from_slice(struct_hash);
    keccak256(buf)
}
