//! The cool-ast Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::Parser;
use log::{debug, info};
use thiserror::Error;

use crate::ast::Program;
use crate::cli::args::{Command, CoolArgs};
use crate::config::BuildConfig;
use crate::errors::{print_error, CoolError, SourceContext};
use crate::stack::with_nesting_stack;
use crate::syntax::parser::nesting_allowance;

pub mod args;
pub mod output;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration `{}`: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialise the AST: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Cool(#[from] CoolError),
}

/// The main entry point for the CLI.
pub fn run() {
    let args = CoolArgs::parse();

    if args.verbose {
        init_logging();
    }

    let result = load_config(&args).and_then(|config| {
        with_nesting_stack(nesting_allowance(&config), || {
            dispatch(&args.command, &config)
        })
    });

    if let Err(e) = result {
        match e {
            CliError::Cool(error) => print_error(error),
            other => output::print_failure(&other.to_string()),
        }
        process::exit(1);
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .format_timestamp(None)
        .init();
}

fn load_config(args: &CoolArgs) -> Result<BuildConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = read_file(path)?;
            BuildConfig::from_json(&text).map_err(|source| CliError::Config {
                path: path.clone(),
                source,
            })?
        }
        None => BuildConfig::default(),
    };

    if let Some(depth) = args.max_depth {
        config = config.with_max_nesting_depth(depth);
    }

    debug!("build configuration: {:?}", config);
    Ok(config)
}

fn dispatch(command: &Command, config: &BuildConfig) -> Result<(), CliError> {
    let program = build(command.file(), config)?;

    match command {
        Command::Ast { compact, .. } => handle_ast(&program, *compact),
        Command::Pretty { .. } => {
            print!("{}", program);
            Ok(())
        }
        Command::Check { file } => {
            output::print_success(&format!(
                "{}: {} class(es)",
                file.display(),
                program.classes().len()
            ));
            Ok(())
        }
    }
}

/// Handles the `ast` subcommand.
fn handle_ast(program: &Program, compact: bool) -> Result<(), CliError> {
    let json = if compact {
        serde_json::to_string(program)?
    } else {
        serde_json::to_string_pretty(program)?
    };
    println!("{}", json);
    Ok(())
}

fn build(path: &Path, config: &BuildConfig) -> Result<Program, CliError> {
    let source = SourceContext::from_file(path.display().to_string(), read_file(path)?);
    let program = crate::parse_program_with(&source, config)?;
    info!(
        "built {} class(es) from {}",
        program.classes().len(),
        path.display()
    );
    Ok(program)
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
