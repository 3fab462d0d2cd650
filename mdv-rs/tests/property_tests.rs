use indexmap::IndexMap;
use proptest::prelude::*;

use mdv::script::expr::{eval_str, parse_expr};
use mdv::script::{classify, render_str, Interpreter, LineKind, Value};

/// Names that are plain identifiers and never collide with keywords.
fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}".prop_filter("keyword", |s| {
        !matches!(s.as_str(), "and" | "or" | "not" | "if" | "else" | "in" | "is")
    })
}

/// A variable or expression directive line for one of a few names.
fn directive() -> impl Strategy<Value = String> {
    let key = prop::sample::select(vec!["a", "b", "c", "d"]);
    let rhs = prop_oneof![
        "[0-9]{1,4}",
        "[a-d]",
        "[a-d] [+*-] [0-9]",
        "'[a-z ]{0,5}'",
        "(True|False|true|false)",
    ];
    (prop::bool::ANY, key, rhs).prop_map(|(expr, k, v)| {
        if expr {
            format!("~{k}={v}\n")
        } else {
            format!("@{k}={v}\n")
        }
    })
}

proptest! {
    /// Ensure the expression parser never panics on arbitrary valid UTF-8
    /// input; it should return Ok or Err but not panic.
    #[test]
    fn parser_does_not_panic(s in "\\PC*") {
        let _ = parse_expr(&s);
    }

    /// Deeply nested input is rejected, not a stack overflow.
    #[test]
    fn nesting_is_bounded(depth in 1usize..2000) {
        let src = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let _ = eval_str(&src, &IndexMap::<String, Value>::new());
    }

    /// Long flat operator chains evaluate without deep recursion.
    #[test]
    fn flat_chains_are_bounded(
        terms in 1usize..30_000,
        op in prop::sample::select(vec!["+", "-", "*", "//", " and ", " or ", " < "]),
    ) {
        let src = vec!["1"; terms].join(op);
        prop_assert!(eval_str(&src, &IndexMap::<String, Value>::new()).is_ok());
    }

    /// Rendering never panics, whatever the document looks like.
    #[test]
    fn render_does_not_panic(s in "[@~/{}a-c=+ \n]{0,64}") {
        let _ = render_str(&s, false);
    }
}

/// Directives whose expressions only read `v`, a plain variable that no
/// directive redefines.
fn unchained_directive() -> impl Strategy<Value = String> {
    let key = prop::sample::select(vec!["a", "b", "c", "d"]);
    let rhs = prop_oneof![
        "[0-9]{1,4}",
        Just("v".to_owned()),
        "v [+*-] [0-9]",
        "'[a-z ]{0,5}'",
        "(True|False)",
    ];
    (prop::bool::ANY, key, rhs).prop_map(|(expr, k, v)| {
        if expr {
            format!("~{k}={v}\n")
        } else {
            format!("@{k}={v}\n")
        }
    })
}

proptest! {
    /// `@k=<digits>` stores the integer.
    #[test]
    fn integer_literals(k in name(), n in 0i64..=i64::MAX) {
        let mut interp = Interpreter::new();
        interp.interpret_line(&format!("@{k}={n}\n")).unwrap();
        prop_assert_eq!(interp.variable(&k), Some(&Value::Int(n)));
        prop_assert!(interp.expression(&k).is_none());
    }

    /// `~k=e` registers `e` unless `e` is `k` itself.
    #[test]
    fn expression_registration(k in name(), e in "[a-z0-9+* ]{1,8}") {
        let mut interp = Interpreter::new();
        interp.interpret_line(&format!("@{k}=1\n")).unwrap();
        interp.interpret_line(&format!("~{k}={e}\n")).unwrap();
        let text = e.trim();
        if text == k {
            prop_assert_eq!(interp.variable(&k), Some(&Value::Str(k.clone())));
            prop_assert!(interp.expression(&k).is_none());
        } else if !text.is_empty() {
            prop_assert_eq!(interp.expression(&k), Some(text));
            prop_assert!(interp.variable(&k).is_none());
        }
    }

    /// After any sequence of directives no name is both a variable and an
    /// expression.
    #[test]
    fn stores_are_exclusive(lines in prop::collection::vec(directive(), 0..24)) {
        let mut interp = Interpreter::new();
        for line in &lines {
            interp.interpret_line(line).unwrap();
            for (name, _) in interp.variables() {
                prop_assert!(interp.expression(name).is_none(), "{} in both after {:?}", name, line);
            }
        }
    }

    /// Rendering the same line twice with no directive in between gives the
    /// same output when no expression reads another expression.
    #[test]
    fn render_is_idempotent(lines in prop::collection::vec(unchained_directive(), 0..12)) {
        let mut interp = Interpreter::new();
        interp.interpret_line("@v=7\n").unwrap();
        for line in &lines {
            interp.interpret_line(line).unwrap();
        }
        for n in ["a", "b", "c", "d"] {
            if interp.variable(n).is_none() && interp.expression(n).is_none() {
                interp.interpret_line(&format!("@{n}=0\n")).unwrap();
            }
        }
        let line = "{a} {b} {c} {d}\n";
        let first = interp.render_text(line).unwrap();
        let second = interp.render_text(line).unwrap();
        prop_assert_eq!(first, second);
    }

    /// `/`-prefixed lines come out verbatim minus the slash, defined or not.
    #[test]
    fn escape_is_literal(body in "[a-z ]{0,6}[{}][a-z{} ]{0,8}", defined in prop::bool::ANY) {
        let mut src = String::new();
        if defined {
            src.push_str("@x=1\n");
        }
        src.push_str(&format!("/{body}\n"));
        prop_assert_eq!(render_str(&src, false).unwrap(), format!("{body}\n"));
    }

    /// Lines without sigils or braces are copied unchanged.
    #[test]
    fn plain_text_passes_through(s in "[^@~{}\n]{0,40}\n") {
        prop_assume!(classify(&s) == LineKind::Text);
        prop_assert_eq!(render_str(&s, false).unwrap(), s);
    }
}
