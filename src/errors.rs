//! Cool Error Handling
//!
//! A single error type for every phase of the front end. The kind says what went
//! wrong, the source info says where, and the diagnostic info carries the code and
//! help text miette renders.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::syntax::{Rule, Span};

/// Longest string literal the language accepts, in characters.
pub const MAX_STRING_LENGTH: usize = 1024;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Source text plus a display name, used to render diagnostics
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from real file content
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Create a fallback when real source is unavailable, e.g. for trees built by hand
    pub fn fallback(context: &str) -> Self {
        Self {
            name: "fallback".to_string(),
            content: format!("-- {}", context),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::fallback("default context")
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// The front end's error type
#[derive(Debug)]
pub struct CoolError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it happened
    pub source_info: SourceInfo,
    /// Code and help text for rendering
    pub diagnostic_info: DiagnosticInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("class declaration has no type name")]
    MissingClassType,

    #[error("program does not define any class")]
    EmptyProgram,

    #[error("string literal is {length} characters long, the limit is {limit}")]
    StringLiteralTooLong { length: usize, limit: usize },

    #[error("unrecognized expression form `{rule}`")]
    UnrecognizedExpression { rule: String },

    #[error("invalid {literal_type} literal `{value}`")]
    InvalidLiteral { literal_type: String, value: String },

    #[error("missing {element}")]
    MissingElement { element: String },

    #[error("expected {expected}, found `{found}`")]
    UnexpectedNode { expected: String, found: String },

    #[error("expression nesting exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },

    #[error("{message}")]
    Syntax { message: String },
}

impl ErrorKind {
    /// Error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::MissingClassType => "missing_class_type",
            Self::EmptyProgram => "empty_program",
            Self::StringLiteralTooLong { .. } => "string_too_long",
            Self::UnrecognizedExpression { .. } => "unrecognized_expression",
            Self::InvalidLiteral { .. } => "invalid_literal",
            Self::MissingElement { .. } => "missing_element",
            Self::UnexpectedNode { .. } => "unexpected_node",
            Self::NestingTooDeep { .. } => "nesting_too_deep",
            Self::Syntax { .. } => "syntax",
        }
    }

    fn default_help(&self) -> Option<String> {
        match self {
            Self::MissingClassType => {
                Some("every class declaration needs a type name, e.g. `class Main { ... };`".into())
            }
            Self::EmptyProgram => Some(
                "define at least one class, e.g. `class Main { main(): Object { 0 }; };`".into(),
            ),
            Self::StringLiteralTooLong { limit, .. } => Some(format!(
                "split the literal into pieces of at most {} characters and concatenate them",
                limit
            )),
            Self::UnrecognizedExpression { .. } => Some(
                "the grammar produced a node the AST builder does not know; please report this as a bug"
                    .into(),
            ),
            Self::NestingTooDeep { .. } => {
                Some("raise the limit with `--max-depth` or flatten the expression".into())
            }
            _ => None,
        }
    }
}

/// Front end phase an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Build,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Parse => "parse",
            Phase::Build => "build",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context-specific source information
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: Phase,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

// ============================================================================
// ERROR CONSTRUCTION
// ============================================================================

/// Context-aware error creation
pub trait ErrorReporting {
    fn report(&self, kind: ErrorKind, span: Span) -> CoolError;

    fn missing_element(&self, element: &str, span: Span) -> CoolError {
        self.report(
            ErrorKind::MissingElement {
                element: element.into(),
            },
            span,
        )
    }

    fn unexpected_node(&self, expected: &str, found: Rule, span: Span) -> CoolError {
        self.report(
            ErrorKind::UnexpectedNode {
                expected: expected.into(),
                found: format!("{:?}", found),
            },
            span,
        )
    }

    fn unrecognized_expression(&self, rule: Rule, span: Span) -> CoolError {
        self.report(
            ErrorKind::UnrecognizedExpression {
                rule: format!("{:?}", rule),
            },
            span,
        )
    }
}

/// Error creation context shared by the parser and the AST builder
#[derive(Debug, Clone, Copy)]
pub struct PhaseContext<'a> {
    pub source: &'a SourceContext,
    pub phase: Phase,
}

impl<'a> PhaseContext<'a> {
    pub fn new(source: &'a SourceContext, phase: Phase) -> Self {
        Self { source, phase }
    }
}

impl ErrorReporting for PhaseContext<'_> {
    fn report(&self, kind: ErrorKind, span: Span) -> CoolError {
        let error_code = format!("cool::{}::{}", self.phase, kind.code_suffix());
        let help = kind.default_help();

        CoolError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: to_source_span(span),
                phase: self.phase,
            },
            diagnostic_info: DiagnosticInfo { help, error_code },
        }
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

impl std::error::Error for CoolError {}

impl fmt::Display for CoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.source_info.phase, self.kind)
    }
}

impl Diagnostic for CoolError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label().into()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

impl CoolError {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn phase(&self) -> Phase {
        self.source_info.phase
    }

    pub fn code(&self) -> &str {
        &self.diagnostic_info.error_code
    }

    /// Byte range of the offending source text
    pub fn span(&self) -> Span {
        let offset = self.source_info.primary_span.offset();
        Span::new(offset, offset + self.source_info.primary_span.len())
    }

    fn primary_label(&self) -> &'static str {
        match &self.kind {
            ErrorKind::MissingClassType => "class declared here",
            ErrorKind::EmptyProgram => "no class in this program",
            ErrorKind::StringLiteralTooLong { .. } => "literal too long",
            ErrorKind::UnrecognizedExpression { .. } => "unrecognized expression",
            ErrorKind::InvalidLiteral { .. } => "invalid literal",
            ErrorKind::MissingElement { .. } => "missing here",
            ErrorKind::UnexpectedNode { .. } => "unexpected node",
            ErrorKind::NestingTooDeep { .. } => "nested too deeply",
            ErrorKind::Syntax { .. } => "syntax error",
        }
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

/// Converts an AST span to a miette SourceSpan.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end)
}

/// Prints a CoolError with full miette diagnostics
pub fn print_error(error: CoolError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}
