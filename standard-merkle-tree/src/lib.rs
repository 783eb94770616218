//! Sorted-pair keccak Merkle tree over canonically ABI-encoded records.
//!
//! Records (for example `(address, uint256)` airdrop entries) are encoded as
//! static ABI tuples and committed as leaves
//! `keccak256(keccak256(abi_encode(record)))`. Internal nodes hash their
//! children in sorted order:
//!
//! `node = keccak256(min(left, right) || max(left, right))`
//!
//! so an inclusion proof is just the list of sibling hashes. The tree is a
//! complete binary tree stored as a flat heap-ordered array; odd leaf counts
//! need no padding.
//!
//! # Core types
//!
//! - [`TreeBuilder`]: builds a [`MerkleTree`] from records or from opaque
//!   32-byte leaf commitments.
//! - [`MerkleTree`]: the immutable artifact: root, proofs by index or by
//!   record, dump/load.
//! - [`MerkleProof`]: sibling path with verification and bincode transport.
//! - [`verify`]: stateless proof check.

#![warn(missing_docs)]

pub mod abi;
mod dump;
mod error;
pub mod hash;
pub(crate) mod layout;
pub(crate) mod proof;
pub(crate) mod tree;
mod verify;

#[cfg(test)]
mod tests;

pub use abi::{AbiType, AbiValue, Record};
pub use dump::{DumpRecord, DumpValue, TreeDump};
pub use error::{MerkleTreeError, Result};
pub use hash::{Hash, hash_pair, keccak256, standard_leaf_hash};
pub use proof::MerkleProof;
pub use tree::{IndexedValue, LeafEncoding, MerkleTree, TreeBuilder, TreeOptions};
pub use verify::verify;
