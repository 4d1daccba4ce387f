//! Defines the command-line arguments and subcommands for the cool-ast CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "cool-ast",
    version,
    about = "Parse Cool programs and inspect their abstract syntax tree."
)]
pub struct CoolArgs {
    /// Log build progress to stderr (RUST_LOG refines the filter).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Deepest expression nesting to accept.
    #[arg(long, global = true, value_name = "DEPTH")]
    pub max_depth: Option<usize>,

    /// JSON file with build settings; `--max-depth` overrides it.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the Abstract Syntax Tree (AST) as JSON.
    Ast {
        /// The path to the Cool source file.
        #[arg(required = true)]
        file: PathBuf,

        /// Print on a single line.
        #[arg(long)]
        compact: bool,
    },
    /// Pretty-print a program from its AST.
    Pretty {
        /// The path to the Cool source file.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Build the AST and report whether it succeeded.
    Check {
        /// The path to the Cool source file.
        #[arg(required = true)]
        file: PathBuf,
    },
}

impl Command {
    pub fn file(&self) -> &PathBuf {
        match self {
            Command::Ast { file, .. } | Command::Pretty { file } | Command::Check { file } => file,
        }
    }
}
