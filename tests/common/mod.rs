//! # Cool Test Helpers
//!
//! Constructors for hand-built concrete parse trees, so builder tests can exercise
//! shapes the grammar never produces, and a shortcut for building from source.

#![allow(dead_code)]

use cool_ast::ast::{AstBuilder, Program};
use cool_ast::config::BuildConfig;
use cool_ast::syntax::{CstNode, Rule};
use cool_ast::{CoolError, SourceContext};

pub fn build(cst: &CstNode) -> Result<Program, CoolError> {
    let source = SourceContext::fallback("hand-built tree");
    AstBuilder::new(&source).build_program(cst)
}

pub fn build_with(cst: &CstNode, config: BuildConfig) -> Result<Program, CoolError> {
    let source = SourceContext::fallback("hand-built tree");
    AstBuilder::with_config(&source, config).build_program(cst)
}

pub fn parse(text: &str) -> Result<Program, CoolError> {
    cool_ast::parse_program(&SourceContext::from_file("test.cl", text))
}

// ----------------------------------------------------------------------------
// Program structure
// ----------------------------------------------------------------------------

pub fn program(classes: Vec<CstNode>) -> CstNode {
    CstNode::node(Rule::program, classes)
}

pub fn class(name: &str, parent: Option<&str>, features: Vec<CstNode>) -> CstNode {
    let mut children = vec![CstNode::token(Rule::type_id, name)];
    if let Some(parent) = parent {
        children.push(CstNode::node(
            Rule::inherits,
            vec![CstNode::token(Rule::type_id, parent)],
        ));
    }
    children.push(CstNode::node(Rule::features, features));
    CstNode::node(Rule::class_def, children)
}

pub fn attribute(name: &str, ty: &str, init: Option<CstNode>) -> CstNode {
    let mut children = vec![
        CstNode::token(Rule::object_id, name),
        CstNode::token(Rule::type_id, ty),
    ];
    children.extend(init);
    CstNode::node(Rule::attribute, children)
}

pub fn method(name: &str, formals: &[(&str, &str)], ty: &str, body: CstNode) -> CstNode {
    let formals = formals
        .iter()
        .map(|(name, ty)| {
            CstNode::node(
                Rule::formal,
                vec![
                    CstNode::token(Rule::object_id, *name),
                    CstNode::token(Rule::type_id, *ty),
                ],
            )
        })
        .collect();
    CstNode::node(
        Rule::method,
        vec![
            CstNode::token(Rule::object_id, name),
            CstNode::node(Rule::formals, formals),
            CstNode::token(Rule::type_id, ty),
            body,
        ],
    )
}

/// `class Main { main() : Object { <body> }; };`
pub fn main_with(body: CstNode) -> CstNode {
    program(vec![class("Main", None, vec![method("main", &[], "Object", body)])])
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

pub fn int(text: &str) -> CstNode {
    CstNode::token(Rule::integer, text)
}

pub fn boolean(text: &str) -> CstNode {
    CstNode::token(Rule::boolean, text)
}

/// `raw` is the text between the quotes, escapes unresolved.
pub fn string(raw: &str) -> CstNode {
    CstNode::token(Rule::string, raw)
}

pub fn ident(name: &str) -> CstNode {
    CstNode::node(Rule::identifier, vec![CstNode::token(Rule::object_id, name)])
}

pub fn binary(rule: Rule, left: CstNode, op: Rule, op_text: &str, right: CstNode) -> CstNode {
    CstNode::node(rule, vec![left, CstNode::token(op, op_text), right])
}

pub fn not(operand: CstNode) -> CstNode {
    CstNode::node(Rule::not_expr, vec![operand])
}

pub fn arguments(args: Vec<CstNode>) -> CstNode {
    CstNode::node(Rule::arguments, args)
}
