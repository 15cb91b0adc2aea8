//! Single-assignment variable detection
//!
//! A variable is single-assignment if it is declared exactly once (function
//! parameters and named returns count as declarations) and is never the
//! target of an `:=` assignment. Such a variable holds one value for its
//! whole lifetime and can be modeled as one stable solver variable.

use std::collections::{HashMap, HashSet};

use crate::ast::{Block, FunctionDefinition, Statement, Visit, walk_function_definition,
    walk_statement};

/// Names of all single-assignment variables in `block`
pub fn ssa_variables(block: &Block) -> HashSet<String> {
    let mut tracker = Tracker::default();
    tracker.visit_block(block);
    tracker
        .declarations
        .into_iter()
        .filter(|(name, count)| *count == 1 && !tracker.assigned.contains(name))
        .map(|(name, _)| name)
        .collect()
}

/// Whether every variable name in `block` is declared at most once.
///
/// The optimizer requires disambiguated input; this check guards its
/// entry points.
pub fn has_unique_names(block: &Block) -> bool {
    let mut tracker = Tracker::default();
    tracker.visit_block(block);
    tracker.declarations.values().all(|count| *count == 1)
}

#[derive(Default)]
struct Tracker {
    declarations: HashMap<String, usize>,
    assigned: HashSet<String>,
}

impl Tracker {
    fn declare(&mut self, name: &str) {
        *self.declarations.entry(name.to_string()).or_insert(0) += 1;
    }
}

impl Visit for Tracker {
    fn visit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::VariableDeclaration(decl) => {
                for variable in &decl.variables {
                    self.declare(&variable.name);
                }
            }
            Statement::Assignment(assignment) => {
                for target in &assignment.targets {
                    self.assigned.insert(target.name.clone());
                }
            }
            _ => {}
        }
        walk_statement(self, statement);
    }

    fn visit_function_definition(&mut self, function: &FunctionDefinition) {
        for parameter in &function.parameters {
            self.declare(&parameter.name);
        }
        for ret in &function.returns {
            self.declare(&ret.name);
        }
        walk_function_definition(self, function);
    }
}
