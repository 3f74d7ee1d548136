//! Integer equation evaluation for VHDL generics and IP-XACT parameter fields.
//!
//! ```
//! use eqeval::{evaluate, SymbolTable};
//!
//! let symbols: SymbolTable = [("A", "2"), ("B", "A*3")].into_iter().collect();
//! assert_eq!(evaluate("B+1", &symbols), 7);
//! assert_eq!(evaluate("UNKNOWN+2", &symbols), 1);
//! ```

pub mod error;
pub mod expr;
pub mod sources;
pub mod symbols;
pub mod vhdl;

pub use error::{Error, Result};
pub use expr::{evaluate, EvalError, Evaluator, UNRESOLVED};
pub use symbols::SymbolTable;
