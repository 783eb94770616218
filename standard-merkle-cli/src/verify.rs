use anyhow::Result;
use clap::Args;
use standard_merkle_tree::{MerkleProof, verify};

use crate::common::parse_hash_arg;

/// Check an inclusion proof against a root.
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Expected root
    #[arg(long)]
    pub root: String,

    /// Leaf hash
    #[arg(long)]
    pub leaf: String,

    /// Comma-separated sibling hashes; empty for a single-leaf tree
    #[arg(long, default_value = "")]
    pub proof: String,
}

/// Whether the proof reconstructs the root.
pub fn execute(args: &VerifyArgs) -> Result<bool> {
    let root = parse_hash_arg(&args.root)?;
    let leaf = parse_hash_arg(&args.leaf)?;
    let siblings = args
        .proof
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_hash_arg)
        .collect::<Result<Vec<_>>>()?;
    Ok(verify(&root, &leaf, &MerkleProof::new(siblings)))
}

/// Runs `verify`, printing `true` or `false`. A failed verification is an
/// error so the process exits non-zero.
pub fn run(args: &VerifyArgs) -> Result<()> {
    let valid = execute(args)?;
    println!("{}", valid);
    if !valid {
        anyhow::bail!("Proof does not verify against the given root");
    }
    Ok(())
}
