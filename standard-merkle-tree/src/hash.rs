//! Keccak-256 primitives.
//!
//! Internal nodes hash their children in sorted order; typed records hash
//! twice so a leaf preimage never looks like a pair of child hashes.

use crate::abi::Record;

/// A 32-byte keccak-256 digest.
pub type Hash = [u8; 32];

/// Keccak-256 of `data`.
pub fn keccak256(data: impl AsRef<[u8]>) -> Hash {
    alloy_primitives::keccak256(data).0
}

/// Compute an internal node: `keccak256(min(a, b) || max(a, b))`.
///
/// Ordering the children makes verification independent of which side the
/// sibling sits on.
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo);
    buf[32..].copy_from_slice(hi);
    keccak256(buf)
}

/// Leaf commitment for a typed record: `keccak256(keccak256(abi_encode(record)))`.
///
/// Hashing twice keeps a leaf preimage from ever being 64 bytes that could
/// be confused with an internal node.
pub fn standard_leaf_hash(record: &Record) -> Hash {
    keccak256(keccak256(record.abi_encode()))
}

/// Format a hash as `0x`-prefixed lowercase hex.
pub fn to_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a `0x`-prefixed (or bare) 64-character hex string into a hash.
pub fn parse_hash(s: &str) -> Result<Hash, String> {
    let trimmed = s.trim();
    let cleaned = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if cleaned.len() != 64 {
        return Err(format!(
            "expected 64 hex chars for a 32-byte hash, got {}",
            cleaned.len()
        ));
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut out).map_err(|e| format!("invalid hex: {}", e))?;
    Ok(out)
}
