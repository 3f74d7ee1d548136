use eqeval::{evaluate, EvalError, Evaluator, SymbolTable, UNRESOLVED};
use proptest::prelude::*;

fn table(pairs: &[(&str, &str)]) -> SymbolTable {
    pairs.iter().copied().collect()
}

#[test]
fn rejected_literals_resolve_to_sentinel() {
    let symbols = SymbolTable::new();
    assert_eq!(evaluate("", &symbols), UNRESOLVED);
    assert_eq!(evaluate("4#10#", &symbols), UNRESOLVED);
    assert_eq!(evaluate("'1'", &symbols), UNRESOLVED);
    assert_eq!(evaluate("\"1001\"", &symbols), UNRESOLVED);
}

#[test]
fn division_by_zero_gives_zero() {
    assert_eq!(evaluate("6/0", &SymbolTable::new()), 0);
    assert_eq!(evaluate("1+6/0*3", &SymbolTable::new()), 1);
}

#[test]
fn power_binds_before_multiply() {
    assert_eq!(evaluate("2**3*2", &SymbolTable::new()), 16);
    assert_eq!(evaluate("1+2**4-3*2", &SymbolTable::new()), 11);
}

#[test]
fn symbols_resolve_and_unknowns_propagate() {
    let symbols = table(&[("WIDTH", "8")]);
    assert_eq!(evaluate("WIDTH+2", &symbols), 10);
    assert_eq!(evaluate("UNKNOWN+2", &symbols), 1);
}

#[test]
fn nested_symbols_resolve_recursively() {
    let symbols = table(&[("A", "2"), ("B", "A*3")]);
    assert_eq!(evaluate("B+1", &symbols), 7);
}

#[test]
fn computed_minus_one_is_indistinguishable() {
    let symbols = SymbolTable::new();
    assert_eq!(evaluate("2-3", &symbols), evaluate("NOPE", &symbols));
    assert_eq!(Evaluator::new(&symbols).try_evaluate("2-3"), Ok(-1));
}

#[test]
fn strict_mode_names_the_failure() {
    let symbols = table(&[("LOOP", "LOOP+1"), ("Q", "'1'")]);
    let eval = Evaluator::new(&symbols);

    assert_eq!(eval.try_evaluate(""), Err(EvalError::Empty));
    assert_eq!(eval.try_evaluate("8#17#"), Err(EvalError::BasedLiteral));
    assert_eq!(eval.try_evaluate("Q*2"), Err(EvalError::QuotedLiteral));
    assert_eq!(
        eval.try_evaluate("(1)"),
        Err(EvalError::Malformed("(1)".to_string()))
    );
    assert_eq!(
        eval.try_evaluate("X-1"),
        Err(EvalError::UnknownSymbol("X".to_string()))
    );
    assert_eq!(
        eval.try_evaluate("LOOP"),
        Err(EvalError::Cycle("LOOP".to_string()))
    );
}

#[test]
fn cycles_terminate_in_lenient_mode() {
    let symbols = table(&[("A", "B*2"), ("B", "C+1"), ("C", "A")]);
    // C sees A on the resolution path and counts as -1: B = 0, A = 0.
    assert_eq!(evaluate("A", &symbols), 0);
    assert_eq!(evaluate("B", &symbols), -1);
}

#[test]
fn symbol_file_feeds_the_evaluator() {
    let symbols = SymbolTable::from_yaml_str(
        "ADDR_W: 10\nDEPTH: \"2**ADDR_W\"\nBYTES: DEPTH*4\n",
    )
    .unwrap();
    assert_eq!(evaluate("BYTES-1", &symbols), 4095);
}

/// Sums of products, evaluated the long way.
fn reference(operands: &[i64], ops: &[&str]) -> i64 {
    let mut total = 0;
    let mut sign = 1;
    let mut term = operands[0];

    for (op, &n) in ops.iter().zip(&operands[1..]) {
        match *op {
            "*" => term *= n,
            "+" | "-" => {
                total += sign * term;
                sign = if *op == "+" { 1 } else { -1 };
                term = n;
            }
            _ => unreachable!(),
        }
    }

    total + sign * term
}

proptest! {
    #[test]
    fn literal_expressions_follow_precedence(
        first in 0i64..=20,
        rest in prop::collection::vec((prop::sample::select(vec!["+", "-", "*"]), 0i64..=20), 0..7),
        spaced in any::<bool>(),
    ) {
        let mut operands = vec![first];
        let mut ops = Vec::new();
        let mut text = first.to_string();
        let sep = if spaced { " " } else { "" };

        for (op, n) in &rest {
            ops.push(*op);
            operands.push(*n);
            text.push_str(&format!("{sep}{op}{sep}{n}"));
        }

        prop_assert_eq!(evaluate(&text, &SymbolTable::new()), reference(&operands, &ops));
    }

    #[test]
    fn power_then_product_then_sum(a in 0i64..=12, b in 0i64..=4, c in 0i64..=50, d in 0i64..=50) {
        let expected = a.pow(b as u32) * c - d;
        prop_assert_eq!(evaluate(&format!("{a}**{b}*{c}-{d}"), &SymbolTable::new()), expected);
    }
}
