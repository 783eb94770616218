//! Typed structured-data hashing.
//!
//! Produces struct hashes of typed messages (orders, permits and the like)
//! following the EIP-712 encoding rules. The hashes are opaque 32-byte
//! commitments that can be fed to
//! [`TreeBuilder::build_simple`](standard_merkle_tree::TreeBuilder::build_simple)
//! to commit to many signed messages under one root.
//!
//! ```text
//! type_hash   = keccak256(encode_type(primary))
//! struct_hash = keccak256(type_hash || encode_data(message))
//! signing     = keccak256(0x1901 || domain_separator || struct_hash)
//! ```

#![warn(missing_docs)]

mod document;
mod domain;
mod encode;
mod error;
mod types;
mod value;


pub use document::TypedData;
pub use domain::{DOMAIN_TYPE, Eip712Domain, signing_hash};
pub use error::{Result, TypedDataError};
pub use types::{FieldType, TypedDataTypes, TypedField};
pub use value::TypedValue;
