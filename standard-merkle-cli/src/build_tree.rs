use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use standard_merkle_tree::{
    AbiType, Hash, Record, TreeBuilder, TreeOptions,
    hash::{parse_hash, to_hex},
};

use crate::common::{read_json, scalar_to_string, write_file_atomic};

/// Build a tree artifact from a JSON list of records.
#[derive(Args, Debug, Clone)]
pub struct BuildTreeArgs {
    /// JSON file with an array of records (arrays of field values), or of
    /// 32-byte hex leaves with `--simple`
    #[arg(short, long)]
    pub input: PathBuf,

    /// Comma-separated field types, e.g. `address,uint256`
    #[arg(short, long, required_unless_present = "simple")]
    pub types: Option<String>,

    /// Output file for the tree artifact
    #[arg(short, long)]
    pub output: PathBuf,

    /// Keep leaves in input order instead of sorting them by hash
    #[arg(long)]
    pub no_sort: bool,

    /// Treat the input as precomputed leaf commitments
    #[arg(long, conflicts_with = "types")]
    pub simple: bool,
}

/// Builds the tree, writes the artifact and returns the root.
pub fn execute(args: &BuildTreeArgs) -> Result<Hash> {
    let input: Vec<serde_json::Value> = read_json(&args.input)?;
    info!("Read {} entries from {}", input.len(), args.input.display());

    let builder = TreeBuilder::with_options(TreeOptions {
        sort_leaves: !args.no_sort,
    });
    let (root, tree) = if args.simple {
        let leaves = input
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let raw = scalar_to_string(value)?;
                parse_hash(&raw).map_err(|e| anyhow::anyhow!("Leaf {}: {}", i, e))
            })
            .collect::<Result<Vec<_>>>()?;
        builder.build_simple(leaves)?
    } else {
        let types = AbiType::parse_list(args.types.as_deref().unwrap_or_default())?;
        let records = input
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let fields = value
                    .as_array()
                    .with_context(|| format!("Record {} is not an array", i))?
                    .iter()
                    .map(scalar_to_string)
                    .collect::<Result<Vec<_>>>()?;
                Record::parse(&fields, &types).with_context(|| format!("Record {}", i))
            })
            .collect::<Result<Vec<_>>>()?;
        builder.build(records, &types)?
    };

    info!(
        "Built tree with {} leaves, depth {}",
        tree.leaf_count(),
        tree.depth()
    );
    write_file_atomic(&args.output, tree.to_json()?.as_bytes())?;
    info!("Wrote tree artifact to {}", args.output.display());
    Ok(root)
}

/// Runs `build-tree`, printing the root.
pub fn run(args: &BuildTreeArgs) -> Result<()> {
    let root = execute(args)?;
    println!("{}", to_hex(&root));
    Ok(())
}
