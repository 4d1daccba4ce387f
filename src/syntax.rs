//! Syntax module for the Cool language
//!
//! This module owns the concrete side of the front end: the pest grammar, the
//! concrete parse tree ([`CstNode`]) it is lowered into, and source spans.

use serde::{Deserialize, Serialize};

pub mod cst;
pub mod nesting;
pub mod parser;

pub use cst::CstNode;
pub use parser::{parse_cst, Rule};

/// Represents a span in the source code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wrapper for carrying source span information with any value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spanned<T> {
    value: T,
    span: Span,
}

impl<T> Spanned<T> {
    pub(crate) fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// Helper to check if a span is valid for a given source string.
pub fn assert_valid_span(span: Span, source: &str) {
    debug_assert!(
        span.start <= span.end && span.end <= source.len(),
        "Invalid span: {{start: {}, end: {}}} for source of length {}",
        span.start,
        span.end,
        source.len()
    );
}
