//! Detection of `msize` usage
//!
//! If the current-memory-size instruction appears anywhere, rearranging or
//! removing memory operations becomes observable, so memory optimizations
//! have to be suppressed wholesale.

use crate::ast::{Block, Expression, Visit, walk_expression};
use crate::dialect::{EvmDialect, Instruction};

/// Whether `block` contains any call to the current-memory-size builtin
pub fn contains_msize(dialect: &EvmDialect, block: &Block) -> bool {
    let mut finder = Finder {
        dialect,
        found: false,
    };
    finder.visit_block(block);
    finder.found
}

struct Finder<'a> {
    dialect: &'a EvmDialect,
    found: bool,
}

impl Visit for Finder<'_> {
    fn visit_expression(&mut self, expression: &Expression) {
        if self.found {
            return;
        }
        if let Expression::FunctionCall(call) = expression {
            if let Some(builtin) = self.dialect.builtin(&call.function.name) {
                if builtin.instruction == Some(Instruction::Msize) {
                    self.found = true;
                    return;
                }
            }
        }
        walk_expression(self, expression);
    }
}
