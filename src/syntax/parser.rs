//! Cool Parser
//!
//! Runs the pest grammar over source text and lowers the result into the owned
//! concrete parse tree ([`CstNode`]). This layer is purely syntactic: it never
//! interprets literals or names and never builds AST nodes.

use log::debug;
use pest::error::{Error, InputLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::config::BuildConfig;
use crate::errors::{CoolError, ErrorKind, ErrorReporting, Phase, PhaseContext, SourceContext};
use crate::stack::with_nesting_stack;
use crate::syntax::nesting::{exceeds_nesting, SCAN_SLACK};
use crate::syntax::{assert_valid_span, CstNode, Span};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct CoolParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse Cool source text into a concrete parse tree rooted at a `program` node.
///
/// Runs on a stack sized for the configured nesting limit.
pub fn parse_cst(source: &SourceContext, config: &BuildConfig) -> Result<CstNode, CoolError> {
    with_nesting_stack(nesting_allowance(config), || {
        parse_on_current_stack(source, config)
    })
}

/// Levels the lexical scan admits for `config`.
pub fn nesting_allowance(config: &BuildConfig) -> usize {
    config.nesting_limit().saturating_add(SCAN_SLACK)
}

/// [`parse_cst`] without the stack switch; callers provide the stack.
pub(crate) fn parse_on_current_stack(
    source: &SourceContext,
    config: &BuildConfig,
) -> Result<CstNode, CoolError> {
    let ctx = PhaseContext::new(source, Phase::Parse);
    let whole = Span::new(0, source.content.len());
    let limit = config.nesting_limit();

    if let Some(offset) = exceeds_nesting(&source.content, nesting_allowance(config)) {
        return Err(ctx.report(
            ErrorKind::NestingTooDeep { limit },
            Span::new(offset, offset + 1),
        ));
    }

    let mut pairs = CoolParser::parse(Rule::program, &source.content)
        .map_err(|e| convert_parse_error(e, &ctx))?;
    let program = pairs
        .next()
        .ok_or_else(|| ctx.missing_element("program", whole))?;

    let lowering = Lowering {
        ctx,
        max_depth: limit,
    };
    let root = lowering
        .lower(program, 0)?
        .ok_or_else(|| ctx.missing_element("program", whole))?;

    debug!(
        "parsed `{}`: {} class declaration(s)",
        source.name,
        root.children.len()
    );
    Ok(root)
}

// ============================================================================
// LOWERING
// ============================================================================

struct Lowering<'a> {
    ctx: PhaseContext<'a>,
    max_depth: usize,
}

impl Lowering<'_> {
    /// Lowers one pest pair. Keyword tokens and EOI lower to nothing.
    fn lower(&self, pair: Pair<'_, Rule>, depth: usize) -> Result<Option<CstNode>, CoolError> {
        let rule = pair.as_rule();
        let span = get_span(&pair);
        assert_valid_span(span, &self.ctx.source.content);

        if rule == Rule::EOI || is_keyword(rule) {
            return Ok(None);
        }

        if rule == Rule::string {
            let body = pair
                .into_inner()
                .next()
                .map(|p| p.as_str())
                .unwrap_or_default();
            return Ok(Some(CstNode::token(rule, body).at(span)));
        }

        if is_token(rule) {
            return Ok(Some(CstNode::token(rule, pair.as_str()).at(span)));
        }

        let depth = if rule == Rule::expr { depth + 1 } else { depth };
        if depth > self.max_depth {
            return Err(self.ctx.report(
                ErrorKind::NestingTooDeep {
                    limit: self.max_depth,
                },
                span,
            ));
        }

        let mut children = Vec::new();
        for inner in pair.into_inner() {
            if let Some(child) = self.lower(inner, depth)? {
                children.push(child);
            }
        }

        let node = match rule {
            Rule::expr | Rule::unary | Rule::primary => collapse(rule, span, children),
            Rule::comparison | Rule::arith | Rule::term => {
                self.check_chain(children.len().saturating_sub(1) / 2, depth, span)?;
                fold_binary(rule, span, children)
            }
            Rule::dispatch => {
                self.check_chain(children.len().saturating_sub(1), depth, span)?;
                fold_dispatch(span, children)
            }
            _ => CstNode::node(rule, children).at(span),
        };
        Ok(Some(node))
    }

    /// A chain of `links` operators or calls folds into that many nested levels.
    fn check_chain(&self, links: usize, depth: usize, span: Span) -> Result<(), CoolError> {
        if depth.saturating_add(links) > self.max_depth {
            return Err(self.ctx.report(
                ErrorKind::NestingTooDeep {
                    limit: self.max_depth,
                },
                span,
            ));
        }
        Ok(())
    }
}

/// Precedence wrappers with a single child are replaced by that child.
fn collapse(rule: Rule, span: Span, children: Vec<CstNode>) -> CstNode {
    let mut iter = children.into_iter();
    match (iter.next(), iter.next()) {
        (Some(only), None) => only,
        (first, second) => {
            let children = first.into_iter().chain(second).chain(iter).collect();
            CstNode::node(rule, children).at(span)
        }
    }
}

/// `a + b - c` arrives flat; fold it left into `[[a + b] - c]`.
fn fold_binary(rule: Rule, span: Span, children: Vec<CstNode>) -> CstNode {
    let mut parts = children.into_iter();
    let Some(mut folded) = parts.next() else {
        return CstNode::node(rule, Vec::new()).at(span);
    };

    while let Some(operator) = parts.next() {
        let start = folded.span.start;
        let mut operands = vec![folded, operator];
        operands.extend(parts.next());
        let end = operands.last().map_or(start, |n| n.span.end);
        folded = CstNode::node(rule, operands).at(Span::new(start, end));
    }

    folded
}

/// `e.f().g()` arrives as a primary plus suffixes; fold into nested dispatch nodes.
fn fold_dispatch(span: Span, children: Vec<CstNode>) -> CstNode {
    let mut parts = children.into_iter();
    let Some(mut receiver) = parts.next() else {
        return CstNode::node(Rule::dispatch, Vec::new()).at(span);
    };

    for suffix in parts {
        let call_span = receiver.span.join(suffix.span);
        let mut call = Vec::with_capacity(suffix.children.len() + 1);
        call.push(receiver);
        call.extend(suffix.children);
        receiver = CstNode::node(Rule::dispatch, call).at(call_span);
    }

    receiver
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_class
            | Rule::kw_inherits
            | Rule::kw_if
            | Rule::kw_then
            | Rule::kw_else
            | Rule::kw_fi
            | Rule::kw_while
            | Rule::kw_loop
            | Rule::kw_pool
            | Rule::kw_let
            | Rule::kw_in
            | Rule::kw_case
            | Rule::kw_of
            | Rule::kw_esac
            | Rule::kw_new
            | Rule::kw_isvoid
            | Rule::kw_not
    )
}

fn is_token(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::type_id
            | Rule::object_id
            | Rule::integer
            | Rule::boolean
            | Rule::op_plus
            | Rule::op_minus
            | Rule::op_star
            | Rule::op_slash
            | Rule::op_le
            | Rule::op_lt
            | Rule::op_eq
    )
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::type_id => "type identifier".into(),
        Rule::object_id => "object identifier".into(),
        Rule::integer => "integer".into(),
        Rule::string => "string".into(),
        Rule::boolean => "boolean".into(),
        Rule::expr => "expression".into(),
        Rule::class_def => "class declaration".into(),
        Rule::method | Rule::attribute => "feature".into(),
        Rule::formal => "formal parameter".into(),
        Rule::case_arm => "case branch".into(),
        Rule::let_binding => "let binding".into(),
        Rule::op_plus => "`+`".into(),
        Rule::op_minus => "`-`".into(),
        Rule::op_star => "`*`".into(),
        Rule::op_slash => "`/`".into(),
        Rule::op_le => "`<=`".into(),
        Rule::op_lt => "`<`".into(),
        Rule::op_eq => "`=`".into(),
        Rule::kw_class => "`class`".into(),
        Rule::kw_inherits => "`inherits`".into(),
        Rule::kw_then => "`then`".into(),
        Rule::kw_else => "`else`".into(),
        Rule::kw_fi => "`fi`".into(),
        Rule::kw_loop => "`loop`".into(),
        Rule::kw_pool => "`pool`".into(),
        Rule::kw_in => "`in`".into(),
        Rule::kw_of => "`of`".into(),
        Rule::kw_esac => "`esac`".into(),
        Rule::EOI => "end of input".into(),
        other => format!("{:?}", other),
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, ctx: &PhaseContext<'_>) -> CoolError {
    let span = match error.location {
        InputLocation::Pos(pos) => Span::new(pos, pos),
        InputLocation::Span((start, end)) => Span::new(start, end),
    };
    let error = error.renamed_rules(describe_rule);

    ctx.report(
        ErrorKind::Syntax {
            message: error.variant.message().into_owned(),
        },
        span,
    )
}
