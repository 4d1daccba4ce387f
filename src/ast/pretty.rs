//! Renders a [`Program`] back to Cool source.
//!
//! Compound operands are always parenthesised, so re-parsing the output yields
//! the same tree (spans aside) without having to reason about precedence.

use std::fmt::{self, Write};

use crate::ast::{Class, Expr, ExprKind, Feature, Literal, Program};

const INDENT: &str = "    ";

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, class) in self.classes().iter().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            write!(f, "{}", class)?;
        }
        Ok(())
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.name())?;
        if let Some(parent) = self.parent() {
            write!(f, " inherits {}", parent)?;
        }
        f.write_str(" {\n")?;
        for feature in self.features() {
            write_feature(f, feature)?;
        }
        f.write_str("};\n")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self, 0)
    }
}

fn write_feature(f: &mut fmt::Formatter<'_>, feature: &Feature) -> fmt::Result {
    f.write_str(INDENT)?;
    match feature {
        Feature::Attribute(attribute) => {
            write!(f, "{} : {}", attribute.name(), attribute.type_name())?;
            if let Some(init) = attribute.init() {
                f.write_str(" <- ")?;
                write_expr(f, init, 1)?;
            }
        }
        Feature::Method(method) => {
            write!(f, "{}(", method.name())?;
            for (i, formal) in method.formals().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{} : {}", formal.name(), formal.type_name())?;
            }
            write!(f, ") : {} {{\n{}", method.return_type(), INDENT.repeat(2))?;
            write_expr(f, method.body(), 2)?;
            write!(f, "\n{}}}", INDENT)?;
        }
    }
    f.write_str(";\n")
}

fn newline(f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    f.write_char('\n')?;
    f.write_str(&INDENT.repeat(level))
}

/// Writes `expr`; `level` is the indentation of the line it starts on.
fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, level: usize) -> fmt::Result {
    match expr.kind() {
        ExprKind::Literal(literal) => write_literal(f, literal),
        ExprKind::Identifier(name) => f.write_str(name),
        ExprKind::Assign { name, value } => {
            write!(f, "{} <- ", name)?;
            write_expr(f, value, level)
        }
        ExprKind::Dispatch {
            receiver,
            static_type,
            method,
            args,
        } => {
            if let Some(receiver) = receiver {
                write_operand(f, receiver, level)?;
                if let Some(static_type) = static_type {
                    write!(f, "@{}", static_type)?;
                }
                f.write_char('.')?;
            }
            write!(f, "{}(", method)?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_expr(f, arg, level)?;
            }
            f.write_char(')')
        }
        ExprKind::Conditional {
            predicate,
            then_branch,
            else_branch,
        } => {
            f.write_str("if ")?;
            write_expr(f, predicate, level)?;
            f.write_str(" then")?;
            newline(f, level + 1)?;
            write_expr(f, then_branch, level + 1)?;
            newline(f, level)?;
            f.write_str("else")?;
            newline(f, level + 1)?;
            write_expr(f, else_branch, level + 1)?;
            newline(f, level)?;
            f.write_str("fi")
        }
        ExprKind::Loop { predicate, body } => {
            f.write_str("while ")?;
            write_expr(f, predicate, level)?;
            f.write_str(" loop")?;
            newline(f, level + 1)?;
            write_expr(f, body, level + 1)?;
            newline(f, level)?;
            f.write_str("pool")
        }
        ExprKind::Block(body) => {
            f.write_char('{')?;
            for expr in body {
                newline(f, level + 1)?;
                write_expr(f, expr, level + 1)?;
                f.write_char(';')?;
            }
            newline(f, level)?;
            f.write_char('}')
        }
        ExprKind::Let { bindings, body } => {
            f.write_str("let ")?;
            for (i, binding) in bindings.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{} : {}", binding.name(), binding.type_name())?;
                if let Some(init) = binding.init() {
                    f.write_str(" <- ")?;
                    write_operand(f, init, level)?;
                }
            }
            f.write_str(" in")?;
            newline(f, level + 1)?;
            write_expr(f, body, level + 1)
        }
        ExprKind::Case { scrutinee, arms } => {
            f.write_str("case ")?;
            write_expr(f, scrutinee, level)?;
            f.write_str(" of")?;
            for arm in arms {
                newline(f, level + 1)?;
                write!(f, "{} : {} => ", arm.name(), arm.type_name())?;
                write_expr(f, arm.body(), level + 1)?;
                f.write_char(';')?;
            }
            newline(f, level)?;
            f.write_str("esac")
        }
        ExprKind::New(type_name) => write!(f, "new {}", type_name),
        ExprKind::IsVoid(operand) => {
            f.write_str("isvoid ")?;
            write_operand(f, operand, level)
        }
        ExprKind::Not(operand) => {
            f.write_str("not ")?;
            write_operand(f, operand, level)
        }
        ExprKind::Negate(operand) => {
            f.write_char('~')?;
            write_operand(f, operand, level)
        }
        ExprKind::Arithmetic { left, op, right } => {
            write_operand(f, left, level)?;
            write!(f, " {} ", op.symbol())?;
            write_operand(f, right, level)
        }
        ExprKind::Comparison { left, op, right } => {
            write_operand(f, left, level)?;
            write!(f, " {} ", op.symbol())?;
            write_operand(f, right, level)
        }
    }
}

/// Operators, assignments and lets are wrapped in parentheses when nested.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, level: usize) -> fmt::Result {
    let needs_parens = matches!(
        expr.kind(),
        ExprKind::Assign { .. }
            | ExprKind::Let { .. }
            | ExprKind::IsVoid(_)
            | ExprKind::Not(_)
            | ExprKind::Negate(_)
            | ExprKind::Arithmetic { .. }
            | ExprKind::Comparison { .. }
    );
    if needs_parens {
        f.write_char('(')?;
        write_expr(f, expr, level)?;
        f.write_char(')')
    } else {
        write_expr(f, expr, level)
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, literal: &Literal) -> fmt::Result {
    match literal {
        Literal::Bool(value) => write!(f, "{}", value),
        Literal::Int(value) => write!(f, "{}", value),
        Literal::Str(value) => {
            f.write_char('"')?;
            for ch in value.chars() {
                match ch {
                    '"' => f.write_str("\\\"")?,
                    '\\' => f.write_str("\\\\")?,
                    '\n' => f.write_str("\\n")?,
                    '\t' => f.write_str("\\t")?,
                    '\u{8}' => f.write_str("\\b")?,
                    '\u{c}' => f.write_str("\\f")?,
                    other => f.write_char(other)?,
                }
            }
            f.write_char('"')
        }
    }
}
