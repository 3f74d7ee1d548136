/// Why an expression could not be resolved to an integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("expression is empty")]
    Empty,

    #[error("based numerals such as `16#FF#` are not evaluated")]
    BasedLiteral,

    #[error("quoted literals are not evaluated")]
    QuotedLiteral,

    #[error("malformed expression `{0}`")]
    Malformed(String),

    #[error("integer literal `{0}` does not fit in 64 bits")]
    OutOfRange(String),

    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),

    #[error("symbol `{0}` depends on itself")]
    Cycle(String),
}
