//! AST module for the Cool language
//!
//! The typed, immutable tree the builder produces. Nodes are plain data: they are
//! created once by [`builder::AstBuilder`] and only read afterwards, so struct
//! fields are private and exposed through accessors. Expression payloads are
//! public enum fields so downstream phases can match on them exhaustively.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::Serialize;
use std::fmt;

use crate::syntax::{Span, Spanned};

pub mod builder;
mod expressions;
pub mod pretty;

pub use builder::{AstBuilder, CoolAstBuilder};

// ============================================================================
// PROGRAM STRUCTURE
// ============================================================================

/// A whole compilation unit. Always holds at least one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    classes: Vec<Class>,
    span: Span,
}

impl Program {
    pub(crate) fn new(classes: Vec<Class>, span: Span) -> Self {
        debug_assert!(!classes.is_empty());
        Self { classes, span }
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Class {
    name: String,
    parent: Option<String>,
    features: Vec<Feature>,
    span: Span,
}

impl Class {
    pub(crate) fn new(
        name: String,
        parent: Option<String>,
        features: Vec<Feature>,
        span: Span,
    ) -> Self {
        Self {
            name,
            parent,
            features,
            span,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parent type. Unresolved: this is only the name written after `inherits`.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// A class member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Feature {
    Attribute(Attribute),
    Method(Method),
}

impl Feature {
    pub fn name(&self) -> &str {
        match self {
            Feature::Attribute(attribute) => attribute.name(),
            Feature::Method(method) => method.name(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Feature::Attribute(attribute) => attribute.span(),
            Feature::Method(method) => method.span(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    name: String,
    type_name: String,
    init: Option<Expr>,
    span: Span,
}

impl Attribute {
    pub(crate) fn new(name: String, type_name: String, init: Option<Expr>, span: Span) -> Self {
        Self {
            name,
            type_name,
            init,
            span,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// `None` when the declaration has no `<-` initializer.
    pub fn init(&self) -> Option<&Expr> {
        self.init.as_ref()
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    name: String,
    formals: Vec<Formal>,
    return_type: String,
    body: Expr,
    span: Span,
}

impl Method {
    pub(crate) fn new(
        name: String,
        formals: Vec<Formal>,
        return_type: String,
        body: Expr,
        span: Span,
    ) -> Self {
        Self {
            name,
            formals,
            return_type,
            body,
            span,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn formals(&self) -> &[Formal] {
        &self.formals
    }

    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Formal {
    name: String,
    type_name: String,
    span: Span,
}

impl Formal {
    pub(crate) fn new(name: String, type_name: String, span: Span) -> Self {
        Self {
            name,
            type_name,
            span,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// An expression together with its source span.
pub type Expr = Spanned<ExprKind>;

/// The closed set of expression forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(String),
    Assign {
        name: String,
        value: Box<Expr>,
    },
    /// `receiver[@static_type].method(args)`; a missing receiver means `self`.
    Dispatch {
        receiver: Option<Box<Expr>>,
        static_type: Option<String>,
        method: String,
        args: Vec<Expr>,
    },
    Conditional {
        predicate: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Loop {
        predicate: Box<Expr>,
        body: Box<Expr>,
    },
    /// Never empty; evaluates to its last expression.
    Block(Vec<Expr>),
    Let {
        bindings: Vec<LetBinding>,
        body: Box<Expr>,
    },
    /// `arms` is never empty.
    Case {
        scrutinee: Box<Expr>,
        arms: Vec<CaseArm>,
    },
    New(String),
    IsVoid(Box<Expr>),
    Not(Box<Expr>),
    Negate(Box<Expr>),
    Arithmetic {
        left: Box<Expr>,
        op: ArithOp,
        right: Box<Expr>,
    },
    Comparison {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Literal {
    Bool(bool),
    Int(i32),
    /// Escapes already resolved; at most 1024 characters.
    Str(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum CompareOp {
    Lt,
    Eq,
    Le,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Eq => "=",
            CompareOp::Le => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetBinding {
    name: String,
    type_name: String,
    init: Option<Expr>,
    span: Span,
}

impl LetBinding {
    pub(crate) fn new(name: String, type_name: String, init: Option<Expr>, span: Span) -> Self {
        Self {
            name,
            type_name,
            init,
            span,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn init(&self) -> Option<&Expr> {
        self.init.as_ref()
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseArm {
    name: String,
    type_name: String,
    body: Expr,
    span: Span,
}

impl CaseArm {
    pub(crate) fn new(name: String, type_name: String, body: Expr, span: Span) -> Self {
        Self {
            name,
            type_name,
            body,
            span,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

// ============================================================================
// VARIANT TAGS
// ============================================================================

/// Fieldless mirror of [`ExprKind`], handy for diagnostics and tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ExprTag {
    Literal,
    Identifier,
    Assign,
    Dispatch,
    Conditional,
    Loop,
    Block,
    Let,
    Case,
    New,
    IsVoid,
    Not,
    Negate,
    Arithmetic,
    Comparison,
}

impl ExprTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExprTag::Literal => "Literal",
            ExprTag::Identifier => "Identifier",
            ExprTag::Assign => "Assign",
            ExprTag::Dispatch => "Dispatch",
            ExprTag::Conditional => "Conditional",
            ExprTag::Loop => "Loop",
            ExprTag::Block => "Block",
            ExprTag::Let => "Let",
            ExprTag::Case => "Case",
            ExprTag::New => "New",
            ExprTag::IsVoid => "IsVoid",
            ExprTag::Not => "Not",
            ExprTag::Negate => "Negate",
            ExprTag::Arithmetic => "Arithmetic",
            ExprTag::Comparison => "Comparison",
        }
    }
}

impl fmt::Display for ExprTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExprKind {
    pub fn tag(&self) -> ExprTag {
        match self {
            ExprKind::Literal(_) => ExprTag::Literal,
            ExprKind::Identifier(_) => ExprTag::Identifier,
            ExprKind::Assign { .. } => ExprTag::Assign,
            ExprKind::Dispatch { .. } => ExprTag::Dispatch,
            ExprKind::Conditional { .. } => ExprTag::Conditional,
            ExprKind::Loop { .. } => ExprTag::Loop,
            ExprKind::Block(_) => ExprTag::Block,
            ExprKind::Let { .. } => ExprTag::Let,
            ExprKind::Case { .. } => ExprTag::Case,
            ExprKind::New(_) => ExprTag::New,
            ExprKind::IsVoid(_) => ExprTag::IsVoid,
            ExprKind::Not(_) => ExprTag::Not,
            ExprKind::Negate(_) => ExprTag::Negate,
            ExprKind::Arithmetic { .. } => ExprTag::Arithmetic,
            ExprKind::Comparison { .. } => ExprTag::Comparison,
        }
    }
}

impl Expr {
    pub fn kind(&self) -> &ExprKind {
        self.value()
    }

    pub fn tag(&self) -> ExprTag {
        self.value().tag()
    }
}
