//! Yul memory load forwarding
//!
//! An SMT-backed optimizer for a Yul subset: loads from memory are replaced
//! by known stored values when a solver can prove no intervening write
//! touches the loaded word.

pub mod analysis;
pub mod ast;
pub mod dialect;
pub mod error;
pub mod lexer;
pub mod opt;
pub mod parser;
pub mod smt;

pub use ast::Span;
pub use error::{CompileError, Result};
