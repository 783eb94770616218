//! Canonical ABI encoding of static record fields.
//!
//! Every supported type occupies exactly one 32-byte word, so a record
//! encodes as the concatenation of its field words. Values are parsed into
//! typed form first, which makes two spellings of the same value (`0x0a` and
//! `10`, mixed-case addresses, leading zeros) encode identically.

use std::{fmt, str::FromStr};

use alloy_primitives::U256;

use crate::{MerkleTreeError, Result};

/// A static ABI type usable as a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// 20-byte account address.
    Address,
    /// Boolean, encoded as 0 or 1.
    Bool,
    /// Unsigned integer of the given bit width (8..=256, multiple of 8).
    Uint(u16),
    /// Signed integer of the given bit width (8..=256, multiple of 8).
    Int(u16),
    /// Fixed-size byte string of the given length (1..=32).
    FixedBytes(u8),
}

impl AbiType {
    /// Parse a Solidity type name. Equivalent to [`str::parse`].
    pub fn parse(name: &str) -> Result<Self> {
        name.parse()
    }

    /// Parse a comma-separated list such as `"address,uint256"`.
    pub fn parse_list(names: &str) -> Result<Vec<Self>> {
        names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(Self::parse)
            .collect()
    }
}

fn parse_width(suffix: &str, name: &str) -> Result<u16> {
    if suffix.is_empty() {
        return Ok(256);
    }
    let bits: u16 = suffix
        .parse()
        .map_err(|_| MerkleTreeError::UnsupportedType(name.to_string()))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(MerkleTreeError::UnsupportedType(name.to_string()));
    }
    Ok(bits)
}

impl FromStr for AbiType {
    type Err = MerkleTreeError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        match name {
            "address" => return Ok(AbiType::Address),
            "bool" => return Ok(AbiType::Bool),
            _ => {}
        }
        if let Some(suffix) = name.strip_prefix("uint") {
            return Ok(AbiType::Uint(parse_width(suffix, name)?));
        }
        if let Some(suffix) = name.strip_prefix("int") {
            return Ok(AbiType::Int(parse_width(suffix, name)?));
        }
        if let Some(suffix) = name.strip_prefix("bytes") {
            // Dynamic `bytes` has no fixed width and is rejected here.
            let len: u8 = suffix
                .parse()
                .map_err(|_| MerkleTreeError::UnsupportedType(name.to_string()))?;
            if !(1..=32).contains(&len) {
                return Err(MerkleTreeError::UnsupportedType(name.to_string()));
            }
            return Ok(AbiType::FixedBytes(len));
        }
        Err(MerkleTreeError::UnsupportedType(name.to_string()))
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Address => write!(f, "address"),
            AbiType::Bool => write!(f, "bool"),
            AbiType::Uint(bits) => write!(f, "uint{}", bits),
            AbiType::Int(bits) => write!(f, "int{}", bits),
            AbiType::FixedBytes(len) => write!(f, "bytes{}", len),
        }
    }
}

/// A typed field value.
///
/// `Int` holds the 256-bit two's complement word, already sign-extended.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiValue {
    /// 20-byte address.
    Address([u8; 20]),
    /// Boolean.
    Bool(bool),
    /// Unsigned integer.
    Uint(U256),
    /// Signed integer as a two's complement word.
    Int(U256),
    /// Fixed-size bytes, exact length.
    FixedBytes(Vec<u8>),
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

impl AbiValue {
    /// Parse `raw` as a value of type `ty`, enforcing the type's range.
    pub fn parse(ty: AbiType, raw: &str) -> core::result::Result<Self, String> {
        let raw = raw.trim();
        let value = match ty {
            AbiType::Address => {
                let cleaned = strip_hex_prefix(raw);
                if cleaned.len() != 40 {
                    return Err(format!(
                        "invalid address length: expected 40 hex chars, got {}",
                        cleaned.len()
                    ));
                }
                let mut address = [0u8; 20];
                hex::decode_to_slice(cleaned, &mut address)
                    .map_err(|e| format!("invalid address hex: {}", e))?;
                AbiValue::Address(address)
            }
            AbiType::Bool => match raw {
                "true" => AbiValue::Bool(true),
                "false" => AbiValue::Bool(false),
                other => return Err(format!("invalid bool {:?}", other)),
            },
            AbiType::Uint(_) => AbiValue::Uint(parse_u256(raw)?),
            AbiType::Int(_) => {
                let (negative, digits) = match raw.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, raw),
                };
                let magnitude = parse_u256(digits)?;
                if negative {
                    if magnitude > (U256::from(1u8) << 255usize) {
                        return Err(format!("{} does not fit in int256", raw));
                    }
                    AbiValue::Int(magnitude.wrapping_neg())
                } else {
                    if magnitude.bit_len() > 255 {
                        return Err(format!("{} does not fit in int256", raw));
                    }
                    AbiValue::Int(magnitude)
                }
            }
            AbiType::FixedBytes(len) => {
                let bytes = hex::decode(strip_hex_prefix(raw))
                    .map_err(|e| format!("invalid bytes{} hex: {}", len, e))?;
                AbiValue::FixedBytes(bytes)
            }
        };
        value.check(ty)?;
        Ok(value)
    }

    /// Check that this value is a valid instance of `ty`.
    pub fn check(&self, ty: AbiType) -> core::result::Result<(), String> {
        match (self, ty) {
            (AbiValue::Address(_), AbiType::Address) | (AbiValue::Bool(_), AbiType::Bool) => Ok(()),
            (AbiValue::Uint(v), AbiType::Uint(bits)) => {
                if v.bit_len() > bits as usize {
                    Err(format!("{} does not fit in uint{}", v, bits))
                } else {
                    Ok(())
                }
            }
            (AbiValue::Int(word), AbiType::Int(bits)) => {
                let fits = if word.bit(255) {
                    // Negative: magnitude may be at most 2^(bits-1).
                    let magnitude = word.wrapping_neg();
                    (magnitude - U256::from(1u8)).bit_len() < bits as usize
                } else {
                    word.bit_len() < bits as usize
                };
                if fits {
                    Ok(())
                } else {
                    Err(format!("{} does not fit in int{}", self, bits))
                }
            }
            (AbiValue::FixedBytes(bytes), AbiType::FixedBytes(len)) => {
                if bytes.len() == len as usize {
                    Ok(())
                } else {
                    Err(format!(
                        "expected {} bytes for bytes{}, got {}",
                        len,
                        len,
                        bytes.len()
                    ))
                }
            }
            (value, ty) => Err(format!("value {} is not a {}", value, ty)),
        }
    }

    /// The 32-byte ABI word for this value.
    pub fn abi_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        match self {
            AbiValue::Address(address) => word[12..].copy_from_slice(address),
            AbiValue::Bool(b) => word[31] = u8::from(*b),
            AbiValue::Uint(v) | AbiValue::Int(v) => word = v.to_be_bytes::<32>(),
            AbiValue::FixedBytes(bytes) => word[..bytes.len()].copy_from_slice(bytes),
        }
        word
    }
}

fn parse_u256(raw: &str) -> core::result::Result<U256, String> {
    if raw.is_empty() {
        return Err("empty integer".to_string());
    }
    raw.parse::<U256>()
        .map_err(|e| format!("invalid integer {:?}: {}", raw, e))
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Address(address) => write!(f, "0x{}", hex::encode(address)),
            AbiValue::Bool(b) => write!(f, "{}", b),
            AbiValue::Uint(v) => write!(f, "{}", v),
            AbiValue::Int(word) => {
                if word.bit(255) {
                    write!(f, "-{}", word.wrapping_neg())
                } else {
                    write!(f, "{}", word)
                }
            }
            AbiValue::FixedBytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

/// An ordered tuple of typed values, one tree leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record(Vec<AbiValue>);

impl Record {
    /// Wrap already-typed values.
    pub fn new(values: Vec<AbiValue>) -> Self {
        Self(values)
    }

    /// Parse raw strings against the given field types.
    pub fn parse<S: AsRef<str>>(raw: &[S], types: &[AbiType]) -> Result<Self> {
        if raw.len() != types.len() {
            return Err(MerkleTreeError::InvalidRecord(format!(
                "expected {} fields, got {}",
                types.len(),
                raw.len()
            )));
        }
        raw.iter()
            .zip(types)
            .enumerate()
            .map(|(i, (value, ty))| {
                AbiValue::parse(*ty, value.as_ref())
                    .map_err(|e| MerkleTreeError::InvalidRecord(format!("field {}: {}", i, e)))
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// The typed values in field order.
    pub fn values(&self) -> &[AbiValue] {
        &self.0
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check arity and every value against `types`.
    pub fn check(&self, types: &[AbiType]) -> Result<()> {
        if self.0.len() != types.len() {
            return Err(MerkleTreeError::InvalidRecord(format!(
                "expected {} fields, got {}",
                types.len(),
                self.0.len()
            )));
        }
        for (i, (value, ty)) in self.0.iter().zip(types).enumerate() {
            value
                .check(*ty)
                .map_err(|e| MerkleTreeError::InvalidRecord(format!("field {}: {}", i, e)))?;
        }
        Ok(())
    }

    /// ABI encoding of the record as a static tuple.
    pub fn abi_encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 * self.0.len());
        for value in &self.0 {
            out.extend_from_slice(&value.abi_word());
        }
        out
    }

    /// Canonical string form of each value.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_strings().join(", "))
    }
}

impl From<Vec<AbiValue>> for Record {
    fn from(values: Vec<AbiValue>) -> Self {
        Self(values)
    }
}
