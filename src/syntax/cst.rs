//! # Concrete Parse Tree
//!
//! The owned tree the AST builder consumes. Node kinds are the grammar's rules
//! ([`Rule`]); keyword tokens are already stripped and precedence chains are
//! already folded into nested binary nodes, but nothing else is interpreted.
//!
//! ## Shape conventions
//! - Token nodes (`type_id`, `object_id`, `integer`, `boolean`, `string`, operator
//!   tokens) have no children and carry their matched text. A `string` node's text
//!   is the raw content between the quotes, escapes still in place.
//! - Interior nodes have empty text.
//! - Binary nodes (`arith`, `term`, `comparison`) have exactly
//!   `[left, operator, right]` children.
//! - `dispatch` nodes have `[receiver, static_type?, object_id, arguments]`.

use crate::syntax::{Rule, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstNode {
    pub rule: Rule,
    pub span: Span,
    pub text: String,
    pub children: Vec<CstNode>,
}

impl CstNode {
    /// A token node with the given text.
    pub fn token(rule: Rule, text: impl Into<String>) -> Self {
        Self {
            rule,
            span: Span::default(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// An interior node over `children`.
    pub fn node(rule: Rule, children: Vec<CstNode>) -> Self {
        Self {
            rule,
            span: Span::default(),
            text: String::new(),
            children,
        }
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// First direct child produced by `rule`.
    pub fn child(&self, rule: Rule) -> Option<&CstNode> {
        self.children.iter().find(|c| c.rule == rule)
    }

    /// All direct children produced by `rule`, in source order.
    pub fn children_of(&self, rule: Rule) -> impl Iterator<Item = &CstNode> + '_ {
        self.children.iter().filter(move |c| c.rule == rule)
    }

    /// Text of the first direct child produced by `rule`.
    pub fn child_text(&self, rule: Rule) -> Option<&str> {
        self.child(rule).map(|c| c.text.as_str())
    }
}
