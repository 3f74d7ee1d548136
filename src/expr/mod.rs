pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;

pub use ast::UNRESOLVED;
pub use error::EvalError;
pub use eval::{evaluate, Evaluator};
pub use lexer::tokenize;
