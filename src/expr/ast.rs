/// Value returned by the lenient evaluator when an expression or operand
/// cannot be resolved. A computed `-1` looks exactly the same.
pub const UNRESOLVED: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Number(i64),
    Name(String),
    /// All digits, but too large for `i64`.
    OutOfRange(String),
}

impl Operand {
    /// Classifies a word token: base-10 integers become numbers, digit runs
    /// too long for `i64` are kept aside, anything else is a symbol reference.
    pub fn from_word(word: &str) -> Self {
        match word.parse::<i64>() {
            Ok(n) => Operand::Number(n),
            Err(_) if word.bytes().all(|b| b.is_ascii_digit()) => {
                Operand::OutOfRange(word.to_string())
            }
            Err(_) => Operand::Name(word.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Binding strength, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    Power,
    Product,
    Sum,
}

impl Precedence {
    pub const ORDER: [Precedence; 3] = [Precedence::Power, Precedence::Product, Precedence::Sum];
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Sub),
            "*" => Some(Operator::Mul),
            "/" => Some(Operator::Div),
            "**" => Some(Operator::Pow),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Pow => "**",
        }
    }

    pub fn precedence(self) -> Precedence {
        match self {
            Operator::Pow => Precedence::Power,
            Operator::Mul | Operator::Div => Precedence::Product,
            Operator::Add | Operator::Sub => Precedence::Sum,
        }
    }

    /// Integer arithmetic with wrapping overflow. Division by zero gives 0.
    pub fn apply(self, left: i64, right: i64) -> i64 {
        match self {
            Operator::Add => left.wrapping_add(right),
            Operator::Sub => left.wrapping_sub(right),
            Operator::Mul => left.wrapping_mul(right),
            Operator::Div if right == 0 => 0,
            Operator::Div => left.wrapping_div(right),
            Operator::Pow => int_pow(left, right),
        }
    }
}

fn int_pow(base: i64, exponent: i64) -> i64 {
    if exponent < 0 {
        return match base {
            1 => 1,
            -1 if exponent % 2 == 0 => 1,
            -1 => -1,
            _ => 0,
        };
    }
    let exponent = u32::try_from(exponent).unwrap_or(u32::MAX);
    base.wrapping_pow(exponent)
}

/// A tokenized flat equation: `operands[0] operators[0] operands[1] ...`.
///
/// There is always exactly one more operand than operators, so an operator
/// can never come first or last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    operands: Vec<Operand>,
    operators: Vec<Operator>,
}

impl Equation {
    pub fn new(first: Operand) -> Self {
        Self {
            operands: vec![first],
            operators: Vec::new(),
        }
    }

    pub fn push(&mut self, op: Operator, operand: Operand) {
        self.operators.push(op);
        self.operands.push(operand);
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Index of the leftmost operator at the given precedence.
    pub fn leftmost(&self, level: Precedence) -> Option<usize> {
        self.operators.iter().position(|op| op.precedence() == level)
    }

    /// Operator at `index` and the operands on either side of it.
    pub fn operation(&self, index: usize) -> (&Operand, Operator, &Operand) {
        (
            &self.operands[index],
            self.operators[index],
            &self.operands[index + 1],
        )
    }

    /// Replaces `left op right` at operator `index` with a single number.
    pub fn splice(&mut self, index: usize, value: i64) {
        self.operands[index] = Operand::Number(value);
        self.operands.remove(index + 1);
        self.operators.remove(index);
    }

    pub fn first(&self) -> &Operand {
        &self.operands[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_from_word() {
        assert_eq!(Operand::from_word("42"), Operand::Number(42));
        assert_eq!(Operand::from_word("007"), Operand::Number(7));
        assert_eq!(Operand::from_word("WIDTH"), Operand::Name("WIDTH".to_string()));
        assert_eq!(Operand::from_word("0x10"), Operand::Name("0x10".to_string()));
        assert_eq!(
            Operand::from_word("99999999999999999999"),
            Operand::OutOfRange("99999999999999999999".to_string())
        );
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        assert_eq!(Operator::Div.apply(6, 0), 0);
        assert_eq!(Operator::Div.apply(-7, 2), -3);
    }

    #[test]
    fn test_power() {
        assert_eq!(Operator::Pow.apply(2, 3), 8);
        assert_eq!(Operator::Pow.apply(5, 0), 1);
        assert_eq!(Operator::Pow.apply(2, -1), 0);
        assert_eq!(Operator::Pow.apply(1, -4), 1);
        assert_eq!(Operator::Pow.apply(-1, -3), -1);
        assert_eq!(Operator::Pow.apply(-1, -2), 1);
    }

    #[test]
    fn test_overflow_wraps() {
        assert_eq!(Operator::Add.apply(i64::MAX, 1), i64::MIN);
        assert_eq!(Operator::Div.apply(i64::MIN, -1), i64::MIN);
    }

    #[test]
    fn test_splice() {
        let mut eq = Equation::new(Operand::Number(1));
        eq.push(Operator::Add, Operand::Number(2));
        eq.push(Operator::Mul, Operand::Number(3));
        assert_eq!(eq.leftmost(Precedence::Product), Some(1));

        eq.splice(1, 6);
        assert_eq!(eq.operands(), &[Operand::Number(1), Operand::Number(6)]);
        assert_eq!(eq.operators(), &[Operator::Add]);
        assert_eq!(eq.leftmost(Precedence::Product), None);
    }
}
