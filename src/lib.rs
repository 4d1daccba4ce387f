//! Typed AST construction for Cool, a small class-based teaching language.
//!
//! The pipeline has two stages: [`syntax::parse_cst`] turns source text into a
//! concrete parse tree, and [`ast::AstBuilder`] turns that tree into the typed,
//! immutable [`ast::Program`]. [`parse_program`] runs both.

pub use crate::errors::{CoolError, ErrorKind, SourceContext};

pub mod ast;
pub mod cli;
pub mod config;
pub mod errors;
pub mod stack;
pub mod syntax;

use crate::ast::{AstBuilder, Program};
use crate::config::BuildConfig;

/// Parse and build a whole program with the default configuration.
pub fn parse_program(source: &SourceContext) -> Result<Program, CoolError> {
    parse_program_with(source, &BuildConfig::default())
}

/// Parse and build a whole program. Both stages run on a stack sized for the
/// configured nesting limit.
pub fn parse_program_with(
    source: &SourceContext,
    config: &BuildConfig,
) -> Result<Program, CoolError> {
    stack::with_nesting_stack(syntax::parser::nesting_allowance(config), || {
        let cst = syntax::parser::parse_on_current_stack(source, config)?;
        AstBuilder::with_config(source, *config).build_program(&cst)
    })
}
