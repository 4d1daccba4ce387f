//! # AST Builder Module
//!
//! ## Purpose
//! Transforms the concrete parse tree into the typed AST, dropping grammar-only
//! structure. Control flows top-down (program, class, feature, expression) and
//! each level returns a finished subtree to its caller.
//!
//! ## Invariants
//! - Never mutates input
//! - Sibling lists (classes, features, formals, arguments, bindings, arms) are
//!   built strictly left to right
//! - Any error aborts the whole build; no partial tree is returned
//!
//! The builder trusts the tree to be syntactically well formed. It checks only
//! the invariants of the node model: a program has classes, a class has a name,
//! string literals fit the length limit, every expression node is a known form.

use log::debug;

use crate::ast::{Attribute, Class, Feature, Formal, Method, Program};
use crate::config::BuildConfig;
use crate::errors::{CoolError, ErrorKind, ErrorReporting, Phase, PhaseContext, SourceContext};
use crate::syntax::{CstNode, Rule};

/// Main trait for the AST builder stage.
pub trait CoolAstBuilder {
    /// Builds the AST of a whole program from its `program` node.
    fn build_ast(&self, cst: &CstNode) -> Result<Program, CoolError>;
}

/// Stateless builder; one instance can build any number of trees.
#[derive(Debug, Clone, Copy)]
pub struct AstBuilder<'a> {
    pub(super) ctx: PhaseContext<'a>,
    pub(super) config: BuildConfig,
}

impl CoolAstBuilder for AstBuilder<'_> {
    fn build_ast(&self, cst: &CstNode) -> Result<Program, CoolError> {
        self.build_program(cst)
    }
}

impl<'a> AstBuilder<'a> {
    /// `source` is only used to render diagnostics.
    pub fn new(source: &'a SourceContext) -> Self {
        Self::with_config(source, BuildConfig::default())
    }

    pub fn with_config(source: &'a SourceContext, config: BuildConfig) -> Self {
        Self {
            ctx: PhaseContext::new(source, Phase::Build),
            config,
        }
    }

    // ------------------------------------------------------------------------
    // Program
    // ------------------------------------------------------------------------

    pub fn build_program(&self, node: &CstNode) -> Result<Program, CoolError> {
        self.expect_rule(node, Rule::program, "program")?;

        let classes = node
            .children
            .iter()
            .map(|class| self.build_class(class))
            .collect::<Result<Vec<_>, _>>()?;

        if classes.is_empty() {
            return Err(self.ctx.report(ErrorKind::EmptyProgram, node.span));
        }

        debug!("built program with {} class(es)", classes.len());
        Ok(Program::new(classes, node.span))
    }

    // ------------------------------------------------------------------------
    // Class
    // ------------------------------------------------------------------------

    pub fn build_class(&self, node: &CstNode) -> Result<Class, CoolError> {
        self.expect_rule(node, Rule::class_def, "class declaration")?;

        let name = node
            .child_text(Rule::type_id)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| self.ctx.report(ErrorKind::MissingClassType, node.span))?;

        let parent = node
            .child(Rule::inherits)
            .map(|clause| self.required_text(clause, Rule::type_id, "parent type after `inherits`"))
            .transpose()?;

        let features = match node.child(Rule::features) {
            Some(section) if !section.children.is_empty() => section
                .children
                .iter()
                .map(|feature| self.build_feature(feature))
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };

        debug!(
            "built class {} ({} feature(s), parent {:?})",
            name,
            features.len(),
            parent
        );
        Ok(Class::new(name.to_owned(), parent, features, node.span))
    }

    // ------------------------------------------------------------------------
    // Features
    // ------------------------------------------------------------------------

    pub fn build_feature(&self, node: &CstNode) -> Result<Feature, CoolError> {
        match node.rule {
            Rule::attribute => self.build_attribute(node).map(Feature::Attribute),
            Rule::method => self.build_method(node).map(Feature::Method),
            other => Err(self.ctx.unexpected_node("attribute or method", other, node.span)),
        }
    }

    fn build_attribute(&self, node: &CstNode) -> Result<Attribute, CoolError> {
        let name = self.required_text(node, Rule::object_id, "attribute name")?;
        let type_name = self.required_text(node, Rule::type_id, "attribute type")?;
        let init = self.build_optional_expression(expression_children(node).next())?;

        debug!("built attribute {}: {}", name, type_name);
        Ok(Attribute::new(name, type_name, init, node.span))
    }

    fn build_method(&self, node: &CstNode) -> Result<Method, CoolError> {
        let name = self.required_text(node, Rule::object_id, "method name")?;

        let formals = match node.child(Rule::formals) {
            Some(list) => list
                .children
                .iter()
                .map(|formal| self.build_formal(formal))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let return_type = self.required_text(node, Rule::type_id, "method return type")?;
        let body = expression_children(node)
            .next()
            .ok_or_else(|| self.ctx.missing_element("method body", node.span))?;
        let body = self.build_expression(body)?;

        debug!(
            "built method {}({} formal(s)): {}",
            name,
            formals.len(),
            return_type
        );
        Ok(Method::new(name, formals, return_type, body, node.span))
    }

    pub fn build_formal(&self, node: &CstNode) -> Result<Formal, CoolError> {
        self.expect_rule(node, Rule::formal, "formal parameter")?;
        let name = self.required_text(node, Rule::object_id, "parameter name")?;
        let type_name = self.required_text(node, Rule::type_id, "parameter type")?;
        Ok(Formal::new(name, type_name, node.span))
    }

    // ------------------------------------------------------------------------
    // Helpers shared with the expression builder
    // ------------------------------------------------------------------------

    pub(super) fn expect_rule(
        &self,
        node: &CstNode,
        rule: Rule,
        expected: &str,
    ) -> Result<(), CoolError> {
        if node.rule == rule {
            Ok(())
        } else {
            Err(self.ctx.unexpected_node(expected, node.rule, node.span))
        }
    }

    /// Text of the `rule` child of `node`; absent or empty text is an error.
    pub(super) fn required_text(
        &self,
        node: &CstNode,
        rule: Rule,
        element: &str,
    ) -> Result<String, CoolError> {
        node.child_text(rule)
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| self.ctx.missing_element(element, node.span))
    }
}

/// Children of `node` that are expressions, in source order. Names, types and
/// other structural children (formals, bindings, arms, operators) are skipped.
pub(super) fn expression_children(node: &CstNode) -> impl Iterator<Item = &CstNode> + '_ {
    node.children.iter().filter(|child| !is_structural(child.rule))
}

fn is_structural(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::object_id
            | Rule::type_id
            | Rule::formals
            | Rule::static_type
            | Rule::arguments
            | Rule::let_binding
            | Rule::case_arm
            | Rule::op_plus
            | Rule::op_minus
            | Rule::op_star
            | Rule::op_slash
            | Rule::op_lt
            | Rule::op_le
            | Rule::op_eq
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ExprTag;

    fn int(value: &str) -> CstNode {
        CstNode::token(Rule::integer, value)
    }

    fn attribute(name: &str, ty: &str, init: Option<CstNode>) -> CstNode {
        let mut children = vec![
            CstNode::token(Rule::object_id, name),
            CstNode::token(Rule::type_id, ty),
        ];
        children.extend(init);
        CstNode::node(Rule::attribute, children)
    }

    fn class(name: Option<&str>, features: Vec<CstNode>) -> CstNode {
        let mut children = Vec::new();
        children.extend(name.map(|n| CstNode::token(Rule::type_id, n)));
        children.push(CstNode::node(Rule::features, features));
        CstNode::node(Rule::class_def, children)
    }

    #[test]
    fn attribute_without_initializer_is_absent() {
        let source = SourceContext::fallback("unit");
        let builder = AstBuilder::new(&source);

        let bare = builder.build_feature(&attribute("x", "Int", None)).unwrap();
        let zero = builder
            .build_feature(&attribute("x", "Int", Some(int("0"))))
            .unwrap();

        match (bare, zero) {
            (Feature::Attribute(bare), Feature::Attribute(zero)) => {
                assert!(bare.init().is_none());
                assert_eq!(zero.init().map(|e| e.tag()), Some(ExprTag::Literal));
            }
            other => panic!("expected attributes, got {:?}", other),
        }
    }

    #[test]
    fn class_without_feature_section_has_empty_features() {
        let source = SourceContext::fallback("unit");
        let builder = AstBuilder::new(&source);
        let node = CstNode::node(Rule::class_def, vec![CstNode::token(Rule::type_id, "A")]);

        let class = builder.build_class(&node).unwrap();
        assert_eq!(class.name(), "A");
        assert!(class.parent().is_none());
        assert!(class.features().is_empty());
    }

    #[test]
    fn empty_class_name_is_missing() {
        let source = SourceContext::fallback("unit");
        let builder = AstBuilder::new(&source);
        let err = builder.build_class(&class(Some(""), vec![])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingClassType);
    }

    #[test]
    fn method_without_formals_node_has_empty_formals() {
        let source = SourceContext::fallback("unit");
        let builder = AstBuilder::new(&source);
        let node = CstNode::node(
            Rule::method,
            vec![
                CstNode::token(Rule::object_id, "main"),
                CstNode::token(Rule::type_id, "Int"),
                int("1"),
            ],
        );

        match builder.build_feature(&node).unwrap() {
            Feature::Method(method) => {
                assert!(method.formals().is_empty());
                assert_eq!(method.return_type(), "Int");
            }
            other => panic!("expected method, got {:?}", other),
        }
    }

    #[test]
    fn unknown_feature_rule_is_rejected() {
        let source = SourceContext::fallback("unit");
        let builder = AstBuilder::new(&source);
        let err = builder
            .build_feature(&CstNode::node(Rule::formal, vec![]))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedNode { .. }));
    }

    #[test]
    fn program_node_is_required_at_the_top() {
        let source = SourceContext::fallback("unit");
        let builder = AstBuilder::new(&source);
        let err = builder.build_ast(&class(Some("A"), vec![])).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedNode { .. }));
    }
}
