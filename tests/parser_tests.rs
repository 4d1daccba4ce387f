// tests/parser_tests.rs
//
// Source text through the whole pipeline: grammar, lowering, AST builder.

mod common;

use common::parse;
use cool_ast::ast::{ArithOp, CompareOp, Expr, ExprKind, ExprTag, Feature, Literal, Program};
use cool_ast::errors::Phase;
use cool_ast::ErrorKind;

fn body_of(source: &str) -> Expr {
    let text = format!("class Main {{ main() : Object {{ {} }}; }};", source);
    let program = parse(&text).unwrap();
    match &program.classes()[0].features()[0] {
        Feature::Method(method) => method.body().clone(),
        other => panic!("expected a method, got {:?}", other),
    }
}

const SAMPLE: &str = r#"
-- A small but complete program.
class Main inherits IO {
    count : Int <- 0;
    name : String;

    main() : Object {
        {
            out_string("Hello, \"world\"\n");
            count <- count + 1;
            let x : Int <- 3, y : Int in
                if x < y then x else y fi;
            while not count = 10 loop count <- count + 1 pool;
            case self of
                m : Main => m.report(count);
                o : Object => abort();
            esac;
        }
    };

    report(n : Int) : SELF_TYPE {
        (* static dispatch on the parent *)
        self@IO.out_int(~n * 2 - isvoid name)
    };
};

class Counter {
    value() : Int { new Counter.value() };
};
"#;

// ---
// Whole programs
// ---

#[test]
fn test_parse_sample_program() {
    let program = parse(SAMPLE).unwrap();
    assert_eq!(program.classes().len(), 2);

    let main = &program.classes()[0];
    assert_eq!(main.name(), "Main");
    assert_eq!(main.parent(), Some("IO"));
    let names: Vec<_> = main.features().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["count", "name", "main", "report"]);

    let counter = &program.classes()[1];
    assert_eq!(counter.name(), "Counter");
    assert!(counter.parent().is_none());
}

#[test]
fn test_empty_source_is_empty_program() {
    let err = parse("  -- nothing here\n").unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::EmptyProgram);
    assert_eq!(err.phase(), Phase::Build);
}

#[test]
fn test_syntax_error_is_reported_by_the_parser() {
    let err = parse("class Main { main() : Int { 1 };").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Syntax { .. }));
    assert_eq!(err.phase(), Phase::Parse);
    assert_eq!(err.code(), "cool::parse::syntax");
}

#[test]
fn test_keywords_ignore_case() {
    let program = parse("CLASS Main INHERITS IO { f() : Int { IF true THEN 1 ELSE 2 FI }; };").unwrap();
    assert_eq!(program.classes()[0].parent(), Some("IO"));
}

#[test]
fn test_attribute_initializers() {
    let program = parse("class A { x : Int; y : Int <- 0; };").unwrap();
    let features = program.classes()[0].features();
    match (&features[0], &features[1]) {
        (Feature::Attribute(x), Feature::Attribute(y)) => {
            assert!(x.init().is_none());
            assert!(y.init().is_some());
        }
        other => panic!("expected attributes, got {:?}", other),
    }
}

// ---
// Expressions
// ---

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    match body_of("1 + 2 * 3").kind() {
        ExprKind::Arithmetic { op, right, .. } => {
            assert_eq!(*op, ArithOp::Add);
            assert!(matches!(
                right.kind(),
                ExprKind::Arithmetic {
                    op: ArithOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("expected arithmetic, got {:?}", other),
    }
}

#[test]
fn test_subtraction_is_left_associative() {
    match body_of("1 - 2 - 3").kind() {
        ExprKind::Arithmetic { left, op, right } => {
            assert_eq!(*op, ArithOp::Sub);
            assert_eq!(left.tag(), ExprTag::Arithmetic);
            assert_eq!(right.kind(), &ExprKind::Literal(Literal::Int(3)));
        }
        other => panic!("expected arithmetic, got {:?}", other),
    }
}

#[test]
fn test_parentheses_do_not_leave_a_node() {
    match body_of("(1 + 2) * 3").kind() {
        ExprKind::Arithmetic { left, op, .. } => {
            assert_eq!(*op, ArithOp::Mul);
            assert_eq!(left.tag(), ExprTag::Arithmetic);
        }
        other => panic!("expected arithmetic, got {:?}", other),
    }
}

#[test]
fn test_not_covers_the_comparison() {
    match body_of("not 1 <= 2").kind() {
        ExprKind::Not(operand) => match operand.kind() {
            ExprKind::Comparison { op, .. } => assert_eq!(*op, CompareOp::Le),
            other => panic!("expected comparison, got {:?}", other),
        },
        other => panic!("expected not, got {:?}", other),
    }
}

#[test]
fn test_assignment_is_right_associative() {
    match body_of("a <- b <- 3").kind() {
        ExprKind::Assign { name, value } => {
            assert_eq!(name, "a");
            assert!(matches!(value.kind(), ExprKind::Assign { name, .. } if name == "b"));
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_dispatch_chain() {
    match body_of("x.f()@Base.g(1, y)").kind() {
        ExprKind::Dispatch {
            receiver,
            static_type,
            method,
            args,
        } => {
            assert_eq!(method, "g");
            assert_eq!(static_type.as_deref(), Some("Base"));
            assert_eq!(args.len(), 2);
            let receiver = receiver.as_ref().unwrap();
            assert!(matches!(
                receiver.kind(),
                ExprKind::Dispatch { method, receiver: Some(_), .. } if method == "f"
            ));
        }
        other => panic!("expected dispatch, got {:?}", other),
    }
}

#[test]
fn test_let_and_case_keep_their_order() {
    match body_of("let a : Int, b : Int <- 2 in a").kind() {
        ExprKind::Let { bindings, .. } => {
            let names: Vec<_> = bindings.iter().map(|b| b.name()).collect();
            assert_eq!(names, vec!["a", "b"]);
            assert!(bindings[0].init().is_none());
            assert!(bindings[1].init().is_some());
        }
        other => panic!("expected let, got {:?}", other),
    }

    match body_of("case x of i : Int => 1; s : String => 2; esac").kind() {
        ExprKind::Case { arms, .. } => {
            let types: Vec<_> = arms.iter().map(|a| a.type_name()).collect();
            assert_eq!(types, vec!["Int", "String"]);
        }
        other => panic!("expected case, got {:?}", other),
    }
}

#[test]
fn test_string_escapes_are_resolved() {
    assert_eq!(
        body_of(r#""tab\there\nand \"quotes\"""#).kind(),
        &ExprKind::Literal(Literal::Str("tab\there\nand \"quotes\"".into()))
    );
}

#[test]
fn test_long_string_from_source_is_rejected() {
    let text = format!("\"{}\"", "z".repeat(1025));
    let source = format!("class Main {{ s : String <- {}; }};", text);
    let err = parse(&source).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::StringLiteralTooLong { length: 1025, .. }
    ));
    assert_eq!(err.phase(), Phase::Build);
}

#[test]
fn test_integer_out_of_range_is_invalid() {
    let source = "class Main { n : Int <- 99999999999; };";
    let err = parse(source).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidLiteral { .. }));
}

#[test]
fn test_spans_point_into_the_source() {
    let source = "class Main { main() : Int { 40 + 2 }; };";
    let program = parse(source).unwrap();
    let Feature::Method(method) = &program.classes()[0].features()[0] else {
        panic!("expected a method");
    };
    let span = method.body().span();
    assert_eq!(&source[span.start..span.end], "40 + 2");
}

// ---
// Pretty printing
// ---

fn print(program: &Program) -> String {
    program.to_string()
}

#[test]
fn test_pretty_print_is_a_fixpoint() {
    let first = print(&parse(SAMPLE).unwrap());
    let second = print(&parse(&first).unwrap());
    assert_eq!(first, second);
}

#[test]
fn test_pretty_print_keeps_the_tree_shape() {
    let original = body_of("(~(1 + 2) * 3 < 4) = false");
    let printed = original.to_string();
    let reparsed = body_of(&printed);
    assert_eq!(reparsed.to_string(), printed);
    assert_eq!(reparsed.tag(), original.tag());
}

#[test]
fn test_pretty_print_keeps_trailing_not_and_assignment() {
    for source in ["x = not y", "1 + not y", "1 + x <- 2", "~not b", "isvoid x <- 1"] {
        let original = body_of(source);
        let printed = original.to_string();
        let reparsed = body_of(&printed);
        assert_eq!(reparsed.to_string(), printed, "{}", source);
        assert_eq!(reparsed.tag(), original.tag(), "{}", source);
    }
}

// ---
// Trailing `not` and `<-` operands
// ---

#[test]
fn test_not_as_right_operand_of_a_comparison() {
    match body_of("x = not y").kind() {
        ExprKind::Comparison { left, op, right } => {
            assert_eq!(*op, CompareOp::Eq);
            assert_eq!(left.tag(), ExprTag::Identifier);
            assert!(matches!(right.kind(), ExprKind::Not(_)));
        }
        other => panic!("expected comparison, got {:?}", other),
    }
}

#[test]
fn test_not_as_right_operand_of_addition() {
    match body_of("1 + not y").kind() {
        ExprKind::Arithmetic { op, right, .. } => {
            assert_eq!(*op, ArithOp::Add);
            assert!(matches!(right.kind(), ExprKind::Not(_)));
        }
        other => panic!("expected arithmetic, got {:?}", other),
    }
}

#[test]
fn test_assignment_as_right_operand_takes_the_rest() {
    match body_of("1 + x <- 2 * 3").kind() {
        ExprKind::Arithmetic { op, right, .. } => {
            assert_eq!(*op, ArithOp::Add);
            match right.kind() {
                ExprKind::Assign { name, value } => {
                    assert_eq!(name, "x");
                    assert_eq!(value.tag(), ExprTag::Arithmetic);
                }
                other => panic!("expected assignment, got {:?}", other),
            }
        }
        other => panic!("expected arithmetic, got {:?}", other),
    }
}

#[test]
fn test_prefix_operators_accept_not_and_assignment() {
    match body_of("~not b").kind() {
        ExprKind::Negate(operand) => assert!(matches!(operand.kind(), ExprKind::Not(_))),
        other => panic!("expected negation, got {:?}", other),
    }
    match body_of("isvoid x <- 1").kind() {
        ExprKind::IsVoid(operand) => {
            assert!(matches!(operand.kind(), ExprKind::Assign { name, .. } if name == "x"))
        }
        other => panic!("expected isvoid, got {:?}", other),
    }
}

// ---
// Deep nesting
// ---

fn in_main(body: &str) -> String {
    format!("class Main {{ main() : Object {{ {} }}; }};", body)
}

fn nested_parens(levels: usize) -> String {
    in_main(&format!("{}1{}", "(".repeat(levels), ")".repeat(levels)))
}

/// Parses on a fresh thread with the default stack size, the way a caller's
/// worker thread would.
fn parse_on_default_thread(source: String) -> Result<usize, ErrorKind> {
    std::thread::spawn(move || {
        parse(&source)
            .map(|program| program.classes().len())
            .map_err(|err| err.kind().clone())
    })
    .join()
    .unwrap()
}

#[test]
fn test_nesting_near_the_default_limit_parses_on_a_small_stack() {
    assert_eq!(parse_on_default_thread(nested_parens(500)), Ok(1));
}

#[test]
fn test_nesting_past_the_limit_is_an_error_not_a_crash() {
    let sources = [
        nested_parens(5_000),
        in_main(&format!("{}true", "not ".repeat(100_000))),
        in_main(&format!("x{}", ".f()".repeat(100_000))),
        in_main(&format!("1{}", " + 1".repeat(100_000))),
        in_main(&format!("{}1", "a <- ".repeat(100_000))),
    ];
    for source in sources {
        assert_eq!(
            parse_on_default_thread(source),
            Err(ErrorKind::NestingTooDeep { limit: 512 })
        );
    }
}

#[test]
fn test_nesting_error_is_reported_by_the_parser() {
    let err = parse(&nested_parens(600)).unwrap_err();
    assert_eq!(err.phase(), Phase::Parse);
    assert_eq!(err.kind(), &ErrorKind::NestingTooDeep { limit: 512 });
}
