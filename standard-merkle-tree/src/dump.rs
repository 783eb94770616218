//! Serialized artifact format.
//!
//! ```json
//! {
//!   "format": "standard-v1",
//!   "leafEncoding": ["address", "uint256"],
//!   "tree": ["0x…", …],
//!   "values": [{ "value": ["0x…", "0"], "treeIndex": 8 }, …]
//! }
//! ```
//!
//! Simple trees use `"format": "simple-v1"`, omit `leafEncoding`, and store
//! each value as a single hex string.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    MerkleTree, MerkleTreeError, Result,
    abi::{AbiType, AbiValue, Record},
    hash::{parse_hash, to_hex},
    tree::{IndexedValue, LeafEncoding},
};

/// Serializable snapshot of a [`MerkleTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDump {
    /// `standard-v1` or `simple-v1`.
    pub format: String,
    /// Field types, standard trees only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_encoding: Option<Vec<String>>,
    /// Node array in heap order, hex encoded.
    pub tree: Vec<String>,
    /// Records in leaf index order.
    pub values: Vec<DumpValue>,
}

/// One record and its node array position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpValue {
    /// The record's fields.
    pub value: DumpRecord,
    /// Position of the record's leaf in `tree`.
    pub tree_index: usize,
}

/// A dumped record: a field list for standard trees, a single hash for
/// simple trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DumpRecord {
    /// Standard tree record fields in canonical string form.
    Fields(Vec<String>),
    /// Simple tree leaf commitment.
    Leaf(String),
}

impl MerkleTree {
    /// Snapshot this tree into its serializable form.
    pub fn dump(&self) -> TreeDump {
        let leaf_encoding = match &self.encoding {
            LeafEncoding::Standard(types) => Some(types.iter().map(ToString::to_string).collect()),
            LeafEncoding::Simple => None,
        };
        let values = self
            .values
            .iter()
            .map(|v| DumpValue {
                value: match &self.encoding {
                    LeafEncoding::Standard(_) => DumpRecord::Fields(v.record.to_strings()),
                    LeafEncoding::Simple => DumpRecord::Leaf(v.record.values()[0].to_string()),
                },
                tree_index: v.tree_index,
            })
            .collect();
        TreeDump {
            format: self.encoding.format().to_string(),
            leaf_encoding,
            tree: self.tree.iter().map(to_hex).collect(),
            values,
        }
    }

    /// Rebuild a tree from a snapshot, validating it completely.
    ///
    /// Any inconsistency yields [`MerkleTreeError::Deserialization`].
    pub fn load(dump: TreeDump) -> Result<Self> {
        let encoding = match dump.format.as_str() {
            "standard-v1" => {
                let names = dump.leaf_encoding.ok_or_else(|| {
                    MerkleTreeError::Deserialization("missing leafEncoding".to_string())
                })?;
                let types = names
                    .iter()
                    .map(|n| AbiType::parse(n))
                    .collect::<Result<Vec<_>>>()
                    .map_err(|e| MerkleTreeError::Deserialization(e.to_string()))?;
                LeafEncoding::Standard(types)
            }
            "simple-v1" => {
                if dump.leaf_encoding.is_some() {
                    return Err(MerkleTreeError::Deserialization(
                        "simple-v1 artifact must not carry leafEncoding".to_string(),
                    ));
                }
                LeafEncoding::Simple
            }
            other => {
                return Err(MerkleTreeError::Deserialization(format!(
                    "unknown format {:?}",
                    other
                )));
            }
        };

        let tree = dump
            .tree
            .iter()
            .enumerate()
            .map(|(i, h)| {
                parse_hash(h)
                    .map_err(|e| MerkleTreeError::Deserialization(format!("node {}: {}", i, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut values = Vec::with_capacity(dump.values.len());
        for (index, dumped) in dump.values.into_iter().enumerate() {
            let record = match (&encoding, dumped.value) {
                (LeafEncoding::Standard(types), DumpRecord::Fields(fields)) => {
                    Record::parse(&fields, types)
                }
                (LeafEncoding::Simple, DumpRecord::Leaf(leaf)) => {
                    AbiValue::parse(AbiType::FixedBytes(32), &leaf)
                        .map(|v| Record::new(vec![v]))
                        .map_err(MerkleTreeError::InvalidRecord)
                }
                _ => Err(MerkleTreeError::InvalidRecord(
                    "value shape does not match the format".to_string(),
                )),
            }
            .map_err(|e| MerkleTreeError::Deserialization(format!("value {}: {}", index, e)))?;
            if dumped.tree_index >= tree.len() {
                return Err(MerkleTreeError::Deserialization(format!(
                    "value {} points past the end of the tree ({})",
                    index, dumped.tree_index
                )));
            }
            values.push(IndexedValue {
                record,
                tree_index: dumped.tree_index,
            });
        }

        if tree.is_empty() {
            return Err(MerkleTreeError::Deserialization(
                "tree has no nodes".to_string(),
            ));
        }
        let merkle_tree = MerkleTree::from_parts(encoding, tree, values);
        merkle_tree.validate()?;
        debug!(
            "loaded {} tree with {} leaves, root {}",
            merkle_tree.encoding.format(),
            merkle_tree.leaf_count(),
            to_hex(&merkle_tree.root())
        );
        Ok(merkle_tree)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.dump())
            .map_err(|e| MerkleTreeError::Deserialization(format!("encode error: {}", e)))
    }

    /// Parse and validate a JSON artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        let dump: TreeDump = serde_json::from_str(json)
            .map_err(|e| MerkleTreeError::Deserialization(format!("invalid JSON: {}", e)))?;
        Self::load(dump)
    }
}
