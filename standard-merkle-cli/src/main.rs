#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use standard_merkle_cli::{
    build_tree::{self, BuildTreeArgs},
    hash_struct::{self, HashStructArgs},
    prove::{self, ProveArgs},
    verify::{self, VerifyArgs},
};

#[derive(Parser, Debug)]
#[command(name = "merkle")]
#[command(about = "Build standard Merkle trees and work with their proofs", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a tree artifact from records and print its root
    BuildTree(BuildTreeArgs),
    /// Print inclusion proofs from a tree artifact
    Prove(ProveArgs),
    /// Check a proof; exits non-zero when it does not verify
    Verify(VerifyArgs),
    /// Print the struct hash of a typed-data document
    HashStruct(HashStructArgs),
}

fn init_logging(max_level: &str) {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(max_level));
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.verbose { "debug" } else { "info" });

    match cli.command {
        Commands::BuildTree(args) => build_tree::run(&args)?,
        Commands::Prove(args) => prove::run(&args)?,
        Commands::Verify(args) => verify::run(&args)?,
        Commands::HashStruct(args) => hash_struct::run(&args)?,
    }

    Ok(())
}
