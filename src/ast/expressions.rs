//! Expression builder: one concrete expression node in, one [`Expr`] out.
//!
//! Dispatch is a single exhaustive `match` on the node's grammar rule. Every
//! sub-expression is built by recursing on the matching child node; recursion
//! depth is bounded by `BuildConfig::nesting_limit`.

use log::trace;

use super::builder::{expression_children, AstBuilder};
use crate::ast::{ArithOp, CaseArm, CompareOp, Expr, ExprKind, LetBinding, Literal};
use crate::errors::{CoolError, ErrorKind, ErrorReporting, MAX_STRING_LENGTH};
use crate::syntax::{CstNode, Rule};

impl AstBuilder<'_> {
    /// Builds the expression rooted at `node`.
    pub fn build_expression(&self, node: &CstNode) -> Result<Expr, CoolError> {
        self.expression_at(node, 1)
    }

    /// An absent node is an absent expression, not an error.
    pub fn build_optional_expression(
        &self,
        node: Option<&CstNode>,
    ) -> Result<Option<Expr>, CoolError> {
        node.map(|node| self.build_expression(node)).transpose()
    }

    fn expression_at(&self, node: &CstNode, depth: usize) -> Result<Expr, CoolError> {
        let limit = self.config.nesting_limit();
        if depth > limit {
            return Err(self
                .ctx
                .report(ErrorKind::NestingTooDeep { limit }, node.span));
        }
        trace!("expression {:?} at depth {}", node.rule, depth);

        let next = depth + 1;
        let kind = match node.rule {
            Rule::integer => ExprKind::Literal(self.integer_literal(node)?),
            Rule::string => ExprKind::Literal(self.string_literal(node)?),
            Rule::boolean => ExprKind::Literal(self.boolean_literal(node)?),

            Rule::identifier => {
                ExprKind::Identifier(self.required_text(node, Rule::object_id, "identifier name")?)
            }

            Rule::assign => {
                let name = self.required_text(node, Rule::object_id, "assignment target")?;
                let [value] = self.operands(node, "assigned value")?;
                ExprKind::Assign {
                    name,
                    value: self.boxed(value, next)?,
                }
            }

            Rule::dispatch => {
                let [receiver] = self.operands(node, "dispatch receiver")?;
                self.dispatch(node, Some(self.boxed(receiver, next)?), next)?
            }
            Rule::self_dispatch => self.dispatch(node, None, next)?,

            Rule::if_expr => {
                let [predicate, then_branch, else_branch] =
                    self.operands(node, "conditional branch")?;
                ExprKind::Conditional {
                    predicate: self.boxed(predicate, next)?,
                    then_branch: self.boxed(then_branch, next)?,
                    else_branch: self.boxed(else_branch, next)?,
                }
            }

            Rule::while_expr => {
                let [predicate, body] = self.operands(node, "loop predicate or body")?;
                ExprKind::Loop {
                    predicate: self.boxed(predicate, next)?,
                    body: self.boxed(body, next)?,
                }
            }

            Rule::block => {
                let body = expression_children(node)
                    .map(|child| self.expression_at(child, next))
                    .collect::<Result<Vec<_>, _>>()?;
                if body.is_empty() {
                    return Err(self.ctx.missing_element("expression in block", node.span));
                }
                ExprKind::Block(body)
            }

            Rule::let_expr => {
                let bindings = node
                    .children_of(Rule::let_binding)
                    .map(|binding| self.let_binding(binding, next))
                    .collect::<Result<Vec<_>, _>>()?;
                if bindings.is_empty() {
                    return Err(self.ctx.missing_element("let binding", node.span));
                }
                let [body] = self.operands(node, "let body")?;
                ExprKind::Let {
                    bindings,
                    body: self.boxed(body, next)?,
                }
            }

            Rule::case_expr => {
                let [scrutinee] = self.operands(node, "case scrutinee")?;
                let scrutinee = self.boxed(scrutinee, next)?;
                let arms = node
                    .children_of(Rule::case_arm)
                    .map(|arm| self.case_arm(arm, next))
                    .collect::<Result<Vec<_>, _>>()?;
                if arms.is_empty() {
                    return Err(self.ctx.missing_element("case branch", node.span));
                }
                ExprKind::Case { scrutinee, arms }
            }

            Rule::new_expr => {
                ExprKind::New(self.required_text(node, Rule::type_id, "type name after `new`")?)
            }

            Rule::isvoid_expr => {
                let [operand] = self.operands(node, "isvoid operand")?;
                ExprKind::IsVoid(self.boxed(operand, next)?)
            }
            Rule::not_expr => {
                let [operand] = self.operands(node, "not operand")?;
                ExprKind::Not(self.boxed(operand, next)?)
            }
            Rule::negate_expr => {
                let [operand] = self.operands(node, "negation operand")?;
                ExprKind::Negate(self.boxed(operand, next)?)
            }

            Rule::arith | Rule::term => {
                let family = if node.rule == Rule::arith {
                    additive_op
                } else {
                    multiplicative_op
                };
                let op = node
                    .children
                    .iter()
                    .find_map(|child| family(child.rule))
                    .ok_or_else(|| self.ctx.unrecognized_expression(node.rule, node.span))?;
                let [left, right] = self.operands(node, "arithmetic operand")?;
                ExprKind::Arithmetic {
                    left: self.boxed(left, next)?,
                    op,
                    right: self.boxed(right, next)?,
                }
            }

            Rule::comparison => {
                let op = node
                    .children
                    .iter()
                    .find_map(|child| compare_op(child.rule))
                    .ok_or_else(|| self.ctx.unrecognized_expression(node.rule, node.span))?;
                let [left, right] = self.operands(node, "comparison operand")?;
                ExprKind::Comparison {
                    left: self.boxed(left, next)?,
                    op,
                    right: self.boxed(right, next)?,
                }
            }

            Rule::paren => {
                let [inner] = self.operands(node, "parenthesised expression")?;
                return self.expression_at(inner, next);
            }

            other => return Err(self.ctx.unrecognized_expression(other, node.span)),
        };

        Ok(Expr::new(kind, node.span))
    }

    fn boxed(&self, node: &CstNode, depth: usize) -> Result<Box<Expr>, CoolError> {
        self.expression_at(node, depth).map(Box::new)
    }

    /// Exactly `N` expression children of `node`.
    fn operands<'n, const N: usize>(
        &self,
        node: &'n CstNode,
        element: &str,
    ) -> Result<[&'n CstNode; N], CoolError> {
        let found: Vec<&CstNode> = expression_children(node).collect();
        if found.len() > N {
            let extra = found[N];
            return Err(self.ctx.unexpected_node(
                &format!("end of {}", node_name(node.rule)),
                extra.rule,
                extra.span,
            ));
        }
        found
            .try_into()
            .map_err(|_| self.ctx.missing_element(element, node.span))
    }

    // ------------------------------------------------------------------------
    // Compound pieces
    // ------------------------------------------------------------------------

    fn dispatch(
        &self,
        node: &CstNode,
        receiver: Option<Box<Expr>>,
        depth: usize,
    ) -> Result<ExprKind, CoolError> {
        let static_type = node
            .child(Rule::static_type)
            .map(|qualifier| self.required_text(qualifier, Rule::type_id, "static dispatch type"))
            .transpose()?;
        let method = self.required_text(node, Rule::object_id, "method name")?;
        let args = match node.child(Rule::arguments) {
            Some(list) => list
                .children
                .iter()
                .map(|arg| self.expression_at(arg, depth))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(ExprKind::Dispatch {
            receiver,
            static_type,
            method,
            args,
        })
    }

    fn let_binding(&self, node: &CstNode, depth: usize) -> Result<LetBinding, CoolError> {
        let name = self.required_text(node, Rule::object_id, "let variable name")?;
        let type_name = self.required_text(node, Rule::type_id, "let variable type")?;
        let init = expression_children(node)
            .next()
            .map(|init| self.expression_at(init, depth))
            .transpose()?;
        Ok(LetBinding::new(name, type_name, init, node.span))
    }

    fn case_arm(&self, node: &CstNode, depth: usize) -> Result<CaseArm, CoolError> {
        let name = self.required_text(node, Rule::object_id, "case variable name")?;
        let type_name = self.required_text(node, Rule::type_id, "case variable type")?;
        let [body] = self.operands(node, "case branch body")?;
        let body = self.expression_at(body, depth)?;
        Ok(CaseArm::new(name, type_name, body, node.span))
    }

    // ------------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------------

    fn integer_literal(&self, node: &CstNode) -> Result<Literal, CoolError> {
        node.text
            .parse::<i32>()
            .map(Literal::Int)
            .map_err(|_| self.invalid_literal("integer", node))
    }

    fn boolean_literal(&self, node: &CstNode) -> Result<Literal, CoolError> {
        if node.text.eq_ignore_ascii_case("true") {
            Ok(Literal::Bool(true))
        } else if node.text.eq_ignore_ascii_case("false") {
            Ok(Literal::Bool(false))
        } else {
            Err(self.invalid_literal("boolean", node))
        }
    }

    fn string_literal(&self, node: &CstNode) -> Result<Literal, CoolError> {
        let value = unescape(&node.text).ok_or_else(|| self.invalid_literal("string", node))?;
        let length = value.chars().count();
        if length > MAX_STRING_LENGTH {
            return Err(self.ctx.report(
                ErrorKind::StringLiteralTooLong {
                    length,
                    limit: MAX_STRING_LENGTH,
                },
                node.span,
            ));
        }
        Ok(Literal::Str(value))
    }

    fn invalid_literal(&self, literal_type: &str, node: &CstNode) -> CoolError {
        self.ctx.report(
            ErrorKind::InvalidLiteral {
                literal_type: literal_type.into(),
                value: node.text.clone(),
            },
            node.span,
        )
    }
}

fn additive_op(rule: Rule) -> Option<ArithOp> {
    match rule {
        Rule::op_plus => Some(ArithOp::Add),
        Rule::op_minus => Some(ArithOp::Sub),
        _ => None,
    }
}

fn multiplicative_op(rule: Rule) -> Option<ArithOp> {
    match rule {
        Rule::op_star => Some(ArithOp::Mul),
        Rule::op_slash => Some(ArithOp::Div),
        _ => None,
    }
}

fn compare_op(rule: Rule) -> Option<CompareOp> {
    match rule {
        Rule::op_lt => Some(CompareOp::Lt),
        Rule::op_eq => Some(CompareOp::Eq),
        Rule::op_le => Some(CompareOp::Le),
        _ => None,
    }
}

fn node_name(rule: Rule) -> &'static str {
    match rule {
        Rule::if_expr => "conditional",
        Rule::while_expr => "loop",
        Rule::let_expr => "let",
        Rule::case_expr => "case",
        Rule::case_arm => "case branch",
        Rule::dispatch | Rule::self_dispatch => "dispatch",
        Rule::arith | Rule::term => "arithmetic expression",
        Rule::comparison => "comparison",
        _ => "expression",
    }
}

/// Resolves `\b \t \n \f` and `\c` (any other character stands for itself,
/// including an escaped newline). `None` when the text ends in a lone backslash.
fn unescape(raw: &str) -> Option<String> {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }
        match chars.next()? {
            'b' => value.push('\u{8}'),
            't' => value.push('\t'),
            'n' => value.push('\n'),
            'f' => value.push('\u{c}'),
            other => value.push(other),
        }
    }

    Some(value)
}
