use std::collections::HashSet;

use tracing::{debug, warn};

use super::ast::{Operand, Precedence, UNRESOLVED};
use super::error::EvalError;
use super::lexer::tokenize;
use crate::symbols::SymbolTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Unresolved operands become `-1` and take part in the arithmetic.
    Lenient,
    /// The first unresolved operand aborts the evaluation.
    Strict,
}

/// Reduces flat integer equations, resolving names through a symbol table.
///
/// Operators bind in three levels, each reduced leftmost first: `**`, then
/// `*` and `/`, then `+` and `-`. Parentheses are not supported.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> Evaluator<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self { symbols }
    }

    /// Evaluates `expression`, returning `-1` when it cannot be resolved.
    ///
    /// An unknown symbol does not abort the evaluation: it counts as `-1`
    /// inside the arithmetic, so `UNKNOWN+2` gives `1`. Division by zero
    /// gives `0`.
    pub fn evaluate(&self, expression: &str) -> i64 {
        let mut resolving = HashSet::new();
        match self.reduce(expression, Mode::Lenient, &mut resolving) {
            Ok(value) => value,
            Err(e) => {
                debug!(expression, error = %e, "expression unresolved");
                UNRESOLVED
            }
        }
    }

    /// Evaluates `expression` with the same arithmetic as [`evaluate`], but
    /// reports the first piece that could not be resolved instead of
    /// folding it into the result.
    ///
    /// [`evaluate`]: Evaluator::evaluate
    pub fn try_evaluate(&self, expression: &str) -> Result<i64, EvalError> {
        let mut resolving = HashSet::new();
        self.reduce(expression, Mode::Strict, &mut resolving)
    }

    fn reduce(
        &self,
        expression: &str,
        mode: Mode,
        resolving: &mut HashSet<&'a str>,
    ) -> Result<i64, EvalError> {
        let mut equation = tokenize(expression)?;

        for level in Precedence::ORDER {
            while let Some(index) = equation.leftmost(level) {
                let (left, op, right) = equation.operation(index);
                let left = self.resolve(left, mode, resolving)?;
                let right = self.resolve(right, mode, resolving)?;
                let value = op.apply(left, right);
                debug!("{} {} {} = {}", left, op.symbol(), right, value);
                equation.splice(index, value);
            }
        }

        self.resolve(equation.first(), mode, resolving)
    }

    fn resolve(
        &self,
        operand: &Operand,
        mode: Mode,
        resolving: &mut HashSet<&'a str>,
    ) -> Result<i64, EvalError> {
        let name = match operand {
            Operand::Number(n) => return Ok(*n),
            Operand::Name(name) | Operand::OutOfRange(name) => name,
        };

        let resolved = self
            .resolve_symbol(name, mode, resolving)
            .map_err(|e| match (e, operand) {
                (EvalError::UnknownSymbol(word), Operand::OutOfRange(_)) => {
                    EvalError::OutOfRange(word)
                }
                (e, _) => e,
            });

        match (resolved, mode) {
            (Ok(value), _) => Ok(value),
            (Err(e), Mode::Strict) => Err(e),
            (Err(e), Mode::Lenient) => {
                debug!(symbol = %name, error = %e, "operand counts as {}", UNRESOLVED);
                Ok(UNRESOLVED)
            }
        }
    }

    fn resolve_symbol(
        &self,
        name: &str,
        mode: Mode,
        resolving: &mut HashSet<&'a str>,
    ) -> Result<i64, EvalError> {
        let Some((key, expression)) = self.symbols.get_key_value(name) else {
            return Err(EvalError::UnknownSymbol(name.to_string()));
        };

        if !resolving.insert(key) {
            warn!(symbol = key, "symbol depends on itself");
            return Err(EvalError::Cycle(key.to_string()));
        }
        let value = self.reduce(expression, mode, resolving);
        resolving.remove(key);

        value
    }
}

/// Evaluates `expression` against `symbols`, returning `-1` on failure.
pub fn evaluate(expression: &str, symbols: &SymbolTable) -> i64 {
    Evaluator::new(symbols).evaluate(expression)
}
