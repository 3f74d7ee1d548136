use std::sync::LazyLock;

use regex::Regex;

use super::ast::{Equation, Operand, Operator};
use super::error::EvalError;

const WORD: &str = r"[A-Za-z0-9_]+";
const OPERATOR: &str = r"\*\*|[-+*/]";

/// `16#FF#`, `2#1010_0101#`, `16#F.FF#`
static BASED_NUMERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+#[0-9A-Za-z_.]+#").expect("based numeral pattern"));

static QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"['"]"#).expect("quote pattern"));

/// A leading operand followed by any number of operator/operand pairs.
static EQUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*({WORD})((?:\s*(?:{OPERATOR})\s*{WORD})*)\s*$"
    ))
    .expect("equation pattern")
});

static EXTRA_OPERAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\s*({OPERATOR})\s*({WORD})")).expect("extra operand pattern")
});

/// Rejects literal forms that are not arithmetic: empty input, based
/// numerals and quoted logic or vector values.
pub fn check_literals(input: &str) -> Result<(), EvalError> {
    if input.trim().is_empty() {
        return Err(EvalError::Empty);
    }
    if BASED_NUMERAL.is_match(input) {
        return Err(EvalError::BasedLiteral);
    }
    if QUOTE.is_match(input) {
        return Err(EvalError::QuotedLiteral);
    }
    Ok(())
}

/// Splits `input` into alternating operands and operators.
pub fn tokenize(input: &str) -> Result<Equation, EvalError> {
    check_literals(input)?;

    let malformed = || EvalError::Malformed(input.trim().to_string());
    let caps = EQUATION.captures(input).ok_or_else(malformed)?;

    let mut equation = Equation::new(Operand::from_word(&caps[1]));
    for pair in EXTRA_OPERAND.captures_iter(&caps[2]) {
        let op = Operator::from_symbol(&pair[1]).ok_or_else(malformed)?;
        equation.push(op, Operand::from_word(&pair[2]));
    }

    Ok(equation)
}
