use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use serde::Serialize;
use standard_merkle_tree::hash::to_hex;
use standard_merkle_typed_data::TypedData;

use crate::common::read_json;

/// Hash a typed-data document.
#[derive(Args, Debug, Clone)]
pub struct HashStructArgs {
    /// JSON file with `types`, `primaryType`, `message` and optionally `domain`
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Hashes printed by `hash-struct`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructHashes {
    /// Struct hash of the message.
    pub struct_hash: String,
    /// Domain separator, when the document has a domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_separator: Option<String>,
    /// Digest to sign, when the document has a domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_hash: Option<String>,
}

/// Computes the hashes of the document at `args.input`.
pub fn execute(args: &HashStructArgs) -> Result<StructHashes> {
    let json: serde_json::Value = read_json(&args.input)?;
    let typed = TypedData::from_json(&json)
        .with_context(|| format!("Invalid typed data in {}", args.input.display()))?;
    info!("Hashing {} message", typed.primary_type);
    Ok(StructHashes {
        struct_hash: to_hex(&typed.struct_hash()?),
        domain_separator: typed.domain_separator()?.as_ref().map(to_hex),
        signing_hash: typed.signing_hash()?.as_ref().map(to_hex),
    })
}

/// Runs `hash-struct`, printing the hashes as JSON.
pub fn run(args: &HashStructArgs) -> Result<()> {
    let hashes = execute(args)?;
    println!("{}", serde_json::to_string_pretty(&hashes)?);
    Ok(())
}
