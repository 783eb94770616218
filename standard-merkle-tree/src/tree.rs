use std::collections::HashMap;

use log::debug;

use crate::{
    MerkleTreeError, Result,
    abi::{AbiType, AbiValue, Record},
    hash::{Hash, standard_leaf_hash, to_hex},
    layout::{depth_of, leaf_position, make_tree},
};

const SIMPLE_FIELDS: &[AbiType] = &[AbiType::FixedBytes(32)];

/// How records turn into leaf hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafEncoding {
    /// Typed records, leaf = `keccak256(keccak256(abi_encode(record)))`.
    Standard(Vec<AbiType>),
    /// A single opaque 32-byte commitment per leaf, used as-is.
    Simple,
}

impl LeafEncoding {
    /// Field types every record must match.
    pub fn field_types(&self) -> &[AbiType] {
        match self {
            LeafEncoding::Standard(types) => types,
            LeafEncoding::Simple => SIMPLE_FIELDS,
        }
    }

    /// Leaf hash of a record already checked against [`Self::field_types`].
    pub(crate) fn leaf_hash(&self, record: &Record) -> Hash {
        match self {
            LeafEncoding::Standard(_) => standard_leaf_hash(record),
            LeafEncoding::Simple => record.values()[0].abi_word(),
        }
    }

    /// Artifact format tag.
    pub fn format(&self) -> &'static str {
        match self {
            LeafEncoding::Standard(_) => "standard-v1",
            LeafEncoding::Simple => "simple-v1",
        }
    }
}

/// Builder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Sort leaves by hash before laying out the tree. Makes the root
    /// independent of input order.
    pub sort_leaves: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self { sort_leaves: true }
    }
}

/// A record together with its position in the node array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedValue {
    /// The record as supplied to the builder.
    pub record: Record,
    /// Array position of this record's leaf.
    pub tree_index: usize,
}

/// Builds [`MerkleTree`] artifacts from records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    options: TreeOptions,
}

impl TreeBuilder {
    /// Builder with default options (sorted leaves).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with explicit options.
    pub fn with_options(options: TreeOptions) -> Self {
        Self { options }
    }

    /// The options in effect.
    pub fn options(&self) -> TreeOptions {
        self.options
    }

    /// Build a tree over typed records.
    ///
    /// Leaf indices follow the order of `records`. Fails with
    /// [`MerkleTreeError::EmptyInput`] for an empty set and
    /// [`MerkleTreeError::InvalidRecord`] when a record does not match
    /// `field_types`.
    pub fn build(
        &self,
        records: Vec<Record>,
        field_types: &[AbiType],
    ) -> Result<(Hash, MerkleTree)> {
        self.build_with(LeafEncoding::Standard(field_types.to_vec()), records)
    }

    /// Build a tree over opaque 32-byte leaf commitments, such as struct
    /// hashes of signed typed data.
    pub fn build_simple(&self, leaves: Vec<Hash>) -> Result<(Hash, MerkleTree)> {
        let records = leaves
            .into_iter()
            .map(|leaf| Record::new(vec![AbiValue::FixedBytes(leaf.to_vec())]))
            .collect();
        self.build_with(LeafEncoding::Simple, records)
    }

    fn build_with(
        &self,
        encoding: LeafEncoding,
        records: Vec<Record>,
    ) -> Result<(Hash, MerkleTree)> {
        if records.is_empty() {
            return Err(MerkleTreeError::EmptyInput);
        }

        let mut hashed = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            record.check(encoding.field_types()).map_err(|e| match e {
                MerkleTreeError::InvalidRecord(reason) => {
                    MerkleTreeError::InvalidRecord(format!("record {}: {}", index, reason))
                }
                other => other,
            })?;
            hashed.push((encoding.leaf_hash(record), index));
        }
        if self.options.sort_leaves {
            hashed.sort();
        }

        let leaves: Vec<Hash> = hashed.iter().map(|(hash, _)| *hash).collect();
        let tree = make_tree(&leaves);

        let mut tree_indices = vec![0usize; records.len()];
        for (k, (_, index)) in hashed.iter().enumerate() {
            tree_indices[*index] = leaf_position(tree.len(), k);
        }
        let values = records
            .into_iter()
            .zip(tree_indices)
            .map(|(record, tree_index)| IndexedValue { record, tree_index })
            .collect();

        let merkle_tree = MerkleTree::from_parts(encoding, tree, values);
        let root = merkle_tree.root();
        debug!(
            "built {} tree with {} leaves, depth {}, root {}",
            merkle_tree.encoding.format(),
            merkle_tree.leaf_count(),
            merkle_tree.depth(),
            to_hex(&root)
        );
        Ok((root, merkle_tree))
    }
}

/// An immutable, built Merkle tree: the persisted artifact.
///
/// Holds the full node array, the records in input order with their array
/// positions, and a leaf-hash lookup for proof-by-record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    pub(crate) encoding: LeafEncoding,
    pub(crate) tree: Vec<Hash>,
    pub(crate) values: Vec<IndexedValue>,
    lookup: HashMap<Hash, usize>,
}

impl MerkleTree {
    /// Assemble a tree from consistent parts. Callers outside the builder
    /// must run [`MerkleTree::validate`] afterwards.
    pub(crate) fn from_parts(
        encoding: LeafEncoding,
        tree: Vec<Hash>,
        values: Vec<IndexedValue>,
    ) -> Self {
        let mut lookup = HashMap::with_capacity(values.len());
        for (index, value) in values.iter().enumerate() {
            // Duplicate records resolve to their first occurrence.
            lookup.entry(tree[value.tree_index]).or_insert(index);
        }
        Self {
            encoding,
            tree,
            values,
            lookup,
        }
    }

    /// The root commitment.
    pub fn root(&self) -> Hash {
        self.tree[0]
    }

    /// Number of leaves (equal to the number of input records).
    pub fn leaf_count(&self) -> usize {
        self.values.len()
    }

    /// Number of levels below the root.
    pub fn depth(&self) -> usize {
        depth_of(self.tree.len() - 1)
    }

    /// How records are turned into leaves.
    pub fn leaf_encoding(&self) -> &LeafEncoding {
        &self.encoding
    }

    /// The full node array in heap order.
    pub fn nodes(&self) -> &[Hash] {
        &self.tree
    }

    /// Records in input order with their leaf indices.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &Record)> + '_ {
        self.values.iter().map(|v| &v.record).enumerate()
    }

    /// The record at `index`.
    pub fn record(&self, index: usize) -> Result<&Record> {
        Ok(&self.indexed(index)?.record)
    }

    /// Leaf hash of the record at `index`.
    pub fn leaf_hash(&self, index: usize) -> Result<Hash> {
        Ok(self.tree[self.indexed(index)?.tree_index])
    }

    /// Array position of the leaf for record `index`.
    pub fn tree_index(&self, index: usize) -> Result<usize> {
        Ok(self.indexed(index)?.tree_index)
    }

    /// Leaf index of `record`, by value equality.
    pub fn index_of(&self, record: &Record) -> Result<usize> {
        record.check(self.encoding.field_types())?;
        let leaf = self.encoding.leaf_hash(record);
        self.lookup
            .get(&leaf)
            .copied()
            .ok_or_else(|| MerkleTreeError::RecordNotFound(record.to_string()))
    }

    pub(crate) fn indexed(&self, index: usize) -> Result<&IndexedValue> {
        self.values
            .get(index)
            .ok_or(MerkleTreeError::IndexOutOfRange {
                index,
                leaf_count: self.values.len(),
            })
    }
}
