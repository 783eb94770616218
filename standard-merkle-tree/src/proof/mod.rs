//! Inclusion proof generation.
//!
//! A [`MerkleProof`] is the ordered list of sibling hashes from a leaf up
//! to, but excluding, the root. Because nodes use sorted-pair hashing, the
//! proof carries no left/right flags.

use bincode::{Decode, Encode};

use crate::{
    MerkleTree, MerkleTreeError, Result,
    abi::Record,
    hash::{Hash, to_hex},
    layout::{path_for, process_path},
};


/// Longest accepted proof when decoding. A heap-ordered tree with this
/// depth would need more leaves than fit in memory.
const MAX_PROOF_LEN: usize = 64;

/// An inclusion proof for one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct MerkleProof {
    /// Sibling hashes, leaf level first.
    pub siblings: Vec<Hash>,
}

impl MerkleProof {
    /// Wrap a sibling path.
    pub fn new(siblings: Vec<Hash>) -> Self {
        Self { siblings }
    }

    /// Number of sibling hashes.
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// Whether the proof is empty (single-leaf tree).
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Recompute the root implied by this proof for `leaf`.
    pub fn compute_root(&self, leaf: &Hash) -> Hash {
        process_path(leaf, &self.siblings)
    }

    /// Whether this proof links `leaf` to `root`.
    pub fn verify(&self, root: &Hash, leaf: &Hash) -> bool {
        &self.compute_root(leaf) == root
    }

    /// Siblings as `0x`-prefixed hex strings.
    pub fn to_hex_strings(&self) -> Vec<String> {
        self.siblings.iter().map(to_hex).collect()
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| MerkleTreeError::Deserialization(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    ///
    /// Rejects proofs longer than any buildable tree could produce.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ 64 * 1024 }>();
        let (proof, read): (Self, _) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| MerkleTreeError::Deserialization(format!("decode error: {}", e)))?;
        if read != bytes.len() {
            return Err(MerkleTreeError::Deserialization(format!(
                "{} trailing bytes after proof",
                bytes.len() - read
            )));
        }
        if proof.siblings.len() > MAX_PROOF_LEN {
            return Err(MerkleTreeError::Deserialization(format!(
                "proof has {} siblings (max {})",
                proof.siblings.len(),
                MAX_PROOF_LEN
            )));
        }
        Ok(proof)
    }
}

impl MerkleTree {
    /// Proof for the record at leaf `index`.
    ///
    /// Deterministic for a given tree and index. Fails with
    /// [`MerkleTreeError::IndexOutOfRange`] outside `[0, leaf_count)`.
    pub fn prove_by_index(&self, index: usize) -> Result<MerkleProof> {
        let value = self.indexed(index)?;
        Ok(MerkleProof::new(path_for(&self.tree, value.tree_index)))
    }

    /// Proof for `record`, resolved to its leaf index by value equality.
    ///
    /// Fails with [`MerkleTreeError::RecordNotFound`] if the tree does not
    /// contain the record.
    pub fn prove_by_record(&self, record: &Record) -> Result<MerkleProof> {
        let index = self.index_of(record)?;
        self.prove_by_index(index)
    }

    /// Proofs for several records, paired with their leaf indices.
    ///
    /// Fails on the first record that is invalid or absent.
    pub fn prove_many(&self, records: &[Record]) -> Result<Vec<(usize, MerkleProof)>> {
        records
            .iter()
            .map(|record| {
                let index = self.index_of(record)?;
                Ok((index, self.prove_by_index(index)?))
            })
            .collect()
    }

    /// Proofs for every leaf, in leaf index order.
    pub fn prove_all(&self) -> Vec<MerkleProof> {
        self.values
            .iter()
            .map(|v| MerkleProof::new(path_for(&self.tree, v.tree_index)))
            .collect()
    }
}
