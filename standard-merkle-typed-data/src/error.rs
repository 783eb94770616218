use thiserror::Error;

/// Alias for `core::result::Result<T, TypedDataError>`.
pub type Result<T> = core::result::Result<T, TypedDataError>;

/// Errors from typed-data schema parsing and hashing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypedDataError {
    /// A type name that is neither atomic, dynamic, an array nor a known
    /// struct.
    #[error("unknown type: {0}")]
    UnknownType(String),
    /// A struct value lacks one of its schema fields.
    #[error("missing field {field} in {struct_name}")]
    MissingField {
        /// The struct being encoded.
        struct_name: String,
        /// The absent field.
        field: String,
    },
    /// A value does not fit its declared type.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: String,
        /// What went wrong.
        reason: String,
    },
    /// The schema or document JSON is malformed.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}
