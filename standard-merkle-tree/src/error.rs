use thiserror::Error;

/// Alias for `core::result::Result<T, MerkleTreeError>`.
pub type Result<T> = core::result::Result<T, MerkleTreeError>;

/// Errors from tree construction, proof generation and artifact loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleTreeError {
    /// A record's arity or a value does not match the leaf encoding.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// No records were supplied to the builder.
    #[error("cannot build a tree from an empty record set")]
    EmptyInput,
    /// A proof was requested for a record the tree does not contain.
    #[error("record not found in tree: {0}")]
    RecordNotFound(String),
    /// A leaf index outside `[0, leaf_count)`.
    #[error("leaf index {index} out of range (leaf count {leaf_count})")]
    IndexOutOfRange {
        /// The requested leaf index.
        index: usize,
        /// Number of leaves in the tree.
        leaf_count: usize,
    },
    /// A type tag that cannot be used as a record field.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
    /// A serialized artifact or proof is corrupt or schema-mismatched.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}
