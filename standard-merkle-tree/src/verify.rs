//! Proof verification and artifact integrity checks.
//!
//! Verification is a pure function of the root, the leaf and the sibling
//! path; no tree is required.

use std::collections::BTreeSet;

use crate::{
    MerkleTree, MerkleTreeError, Result,
    hash::{Hash, to_hex},
    layout::{check_tree, is_leaf_node},
    proof::MerkleProof,
};

/// Whether `proof` links `leaf` to `root` under sorted-pair hashing.
pub fn verify(root: &Hash, leaf: &Hash, proof: &MerkleProof) -> bool {
    proof.verify(root, leaf)
}

impl MerkleTree {
    /// Verify `proof` for the record at leaf `index` against this tree's
    /// root.
    pub fn verify_index(&self, index: usize, proof: &MerkleProof) -> Result<bool> {
        let leaf = self.leaf_hash(index)?;
        Ok(proof.verify(&self.root(), &leaf))
    }

    /// Check the artifact's internal consistency.
    ///
    /// Every internal node must hash its children, there must be one record
    /// per leaf slot, each record must sit in a distinct leaf slot, and each
    /// record's leaf hash must equal the node stored there.
    pub fn validate(&self) -> Result<()> {
        check_tree(&self.tree).map_err(MerkleTreeError::Deserialization)?;

        let leaf_slots = self.tree.len().div_ceil(2);
        if self.values.len() != leaf_slots {
            return Err(MerkleTreeError::Deserialization(format!(
                "{} values for {} leaf slots",
                self.values.len(),
                leaf_slots
            )));
        }

        let mut seen = BTreeSet::new();
        for (index, value) in self.values.iter().enumerate() {
            if !is_leaf_node(self.tree.len(), value.tree_index) {
                return Err(MerkleTreeError::Deserialization(format!(
                    "value {} points at non-leaf position {}",
                    index, value.tree_index
                )));
            }
            if !seen.insert(value.tree_index) {
                return Err(MerkleTreeError::Deserialization(format!(
                    "leaf position {} is used by more than one value",
                    value.tree_index
                )));
            }
            value
                .record
                .check(self.encoding.field_types())
                .map_err(|e| {
                    MerkleTreeError::Deserialization(format!("value {}: {}", index, e))
                })?;
            let expected = self.encoding.leaf_hash(&value.record);
            let stored = self.tree[value.tree_index];
            if expected != stored {
                return Err(MerkleTreeError::Deserialization(format!(
                    "value {} hashes to {} but position {} holds {}",
                    index,
                    to_hex(&expected),
                    value.tree_index,
                    to_hex(&stored)
                )));
            }
        }
        Ok(())
    }
}
