//! Subcommands of the `merkle` binary.
//!
//! Each module exposes clap arguments, an `execute` function returning the
//! computed result, and a `run` wrapper that prints it.

pub mod build_tree;
pub mod common;
pub mod hash_struct;
pub mod prove;
pub mod verify;

pub use common::write_file_atomic;
