use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use log::info;
use serde::Serialize;
use standard_merkle_tree::{DumpRecord, LeafEncoding, MerkleTree, Record, hash::to_hex};

use crate::common::{load_tree, scalar_to_string};

/// Print inclusion proofs from a tree artifact.
#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("target").required(true).args(["index", "record", "all"])))]
pub struct ProveArgs {
    /// Tree artifact written by `build-tree`
    #[arg(short, long)]
    pub tree: PathBuf,

    /// Leaf index (position in the original input)
    #[arg(long)]
    pub index: Option<usize>,

    /// Record as JSON, e.g. `["0x…01", "0"]`, or a hex leaf for simple trees
    #[arg(long)]
    pub record: Option<String>,

    /// Print proofs for every leaf
    #[arg(long)]
    pub all: bool,
}

/// One proof as printed by `prove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofEntry {
    /// Position of the record in the original input.
    pub leaf_index: usize,
    /// The record itself.
    pub value: DumpRecord,
    /// Leaf hash.
    pub leaf: String,
    /// Sibling hashes from the leaf upward.
    pub proof: Vec<String>,
}

fn entry(tree: &MerkleTree, index: usize) -> Result<ProofEntry> {
    let record = tree.record(index)?;
    let value = match tree.leaf_encoding() {
        LeafEncoding::Standard(_) => DumpRecord::Fields(record.to_strings()),
        LeafEncoding::Simple => DumpRecord::Leaf(to_hex(&tree.leaf_hash(index)?)),
    };
    Ok(ProofEntry {
        leaf_index: index,
        value,
        leaf: to_hex(&tree.leaf_hash(index)?),
        proof: tree.prove_by_index(index)?.to_hex_strings(),
    })
}

/// A JSON array of field values, or a single scalar for one-field records.
fn parse_record(tree: &MerkleTree, raw: &str) -> Result<Record> {
    let json: serde_json::Value =
        serde_json::from_str(raw).with_context(|| format!("Invalid record JSON {:?}", raw))?;
    let fields = match &json {
        serde_json::Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Result<Vec<_>>>()?,
        scalar => vec![scalar_to_string(scalar)?],
    };
    Ok(Record::parse(&fields, tree.leaf_encoding().field_types())?)
}

/// Resolves the requested proofs.
pub fn execute(args: &ProveArgs) -> Result<Vec<ProofEntry>> {
    let tree = load_tree(&args.tree)?;
    info!(
        "Loaded tree with {} leaves from {}",
        tree.leaf_count(),
        args.tree.display()
    );

    if args.all {
        return (0..tree.leaf_count()).map(|i| entry(&tree, i)).collect();
    }
    let index = match (&args.record, args.index) {
        (Some(raw), _) => tree.index_of(&parse_record(&tree, raw)?)?,
        (None, Some(index)) => index,
        (None, None) => anyhow::bail!("One of --index, --record or --all is required"),
    };
    Ok(vec![entry(&tree, index)?])
}

/// Runs `prove`, printing JSON: one object, or an array with `--all`.
pub fn run(args: &ProveArgs) -> Result<()> {
    let entries = execute(args)?;
    let output = if args.all {
        serde_json::to_string_pretty(&entries)?
    } else {
        serde_json::to_string_pretty(&entries[0])?
    };
    println!("{}", output);
    Ok(())
}
