use std::{fs, io::Write, path::Path};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use standard_merkle_tree::{Hash, MerkleTree, hash::parse_hash};
use tempfile::NamedTempFile;

/// Reads and parses a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Writes `contents` to `path` through a temporary file in the same
/// directory, renamed into place once fully written.
pub fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    file.write_all(contents).context("Failed to write temp file")?;
    file.as_file().sync_all().context("Failed to sync temp file")?;
    file.persist(path)
        .with_context(|| format!("Failed to move temp file to {}", path.display()))?;
    Ok(())
}

/// Loads and validates a tree artifact.
pub fn load_tree(path: &Path) -> Result<MerkleTree> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    MerkleTree::from_json(&content)
        .with_context(|| format!("Invalid tree artifact {}", path.display()))
}

/// Parses a 32-byte hex hash argument.
pub fn parse_hash_arg(raw: &str) -> Result<Hash> {
    parse_hash(raw.trim()).map_err(|e| anyhow::anyhow!("Invalid hash {:?}: {}", raw, e))
}

/// Spells a JSON scalar as the string the record parser expects.
pub fn scalar_to_string(value: &serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => anyhow::bail!("Expected a string, number or bool, got {}", other),
    }
}
