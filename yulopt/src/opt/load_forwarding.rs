//! Memory load forwarding
//!
//! Replaces `mload(a)` with a known value variable when a preceding
//! `mstore(a, v)` is still in effect. Memory contents are tracked in a map
//! from address variable to value variable; a store enters the map only
//! when both operands are single-assignment variables, and every
//! memory-writing instruction between the store and the load must be
//! provably disjoint from the tracked word for the entry to survive.
//! Disjointness proofs are discharged through the [`Solver`] interface: the
//! overlap hypothesis must come back `Unsatisfiable`, so an `Unknown`
//! answer invalidates just like a `Satisfiable` one.
//!
//! The input must have globally unique variable names. Programs that use
//! `msize` are left untouched: removing a memory access would change the
//! value `msize` observes.

use std::collections::{HashMap, HashSet};

use num_bigint::BigInt;

use crate::analysis::{
    ScopeTracker, call_graph, contains_msize, function_side_effects, has_unique_names,
    ssa_variables,
};
use crate::ast::{Block, Expression, FunctionCall, Identifier, Statement};
use crate::dialect::{
    EvmDialect, Instruction, SideEffects, WORD_SIZE, max_environment_data_size, word_modulus,
};
use crate::smt::{CheckResult, LinearSolver, SmtExpr, Solver, Sort};

pub struct LoadForwarding<'a> {
    dialect: &'a EvmDialect,
    function_effects: HashMap<String, SideEffects>,
    ssa: HashSet<String>,
    solver: Box<dyn Solver>,
    /// Solver counterpart of every single-assignment variable declared so
    /// far. Reassignable names stay out: their value changes between
    /// program points, so each mention encodes as a fresh unknown instead.
    variables: HashMap<String, SmtExpr>,
    /// Tracked memory contents: address variable to value variable
    memory: HashMap<String, String>,
    scope: ScopeTracker,
    counter: u64,
}

impl<'a> LoadForwarding<'a> {
    /// Run the pass with the built-in solver backend
    pub fn run(dialect: &'a EvmDialect, block: &mut Block) {
        Self::run_with_solver(dialect, block, Box::new(LinearSolver::new()));
    }

    pub fn run_with_solver(dialect: &'a EvmDialect, block: &mut Block, solver: Box<dyn Solver>) {
        assert!(
            has_unique_names(block),
            "load forwarding requires globally unique variable names"
        );
        if contains_msize(dialect, block) {
            return;
        }
        let mut pass = LoadForwarding {
            dialect,
            function_effects: function_side_effects(dialect, &call_graph(block)),
            ssa: ssa_variables(block),
            solver,
            variables: HashMap::new(),
            memory: HashMap::new(),
            scope: ScopeTracker::new(),
            counter: 0,
        };
        pass.visit_block(block);
    }

    fn visit_block(&mut self, block: &mut Block) {
        self.scope.enter_block();
        for statement in &mut block.statements {
            self.visit_statement(statement);
        }
        self.scope.leave();
    }

    fn visit_statement(&mut self, statement: &mut Statement) {
        match statement {
            Statement::Block(block) => self.visit_block(block),
            Statement::VariableDeclaration(decl) => {
                if let Some(value) = &mut decl.value {
                    self.visit_expression(value);
                }
                let pinnable = decl.variables.len() == 1 && decl.value.is_some();
                for variable in &decl.variables {
                    self.scope.declare(&variable.name);
                    if self.ssa.contains(&variable.name) {
                        let value = if pinnable { decl.value.as_ref() } else { None };
                        self.define_variable(&variable.name, value);
                    }
                }
            }
            Statement::Assignment(assignment) => self.visit_expression(&mut assignment.value),
            Statement::Expression(expression) => self.visit_expression(expression),
            Statement::If(if_statement) => {
                self.visit_expression(&mut if_statement.condition);
                // The body may not execute: keep only entries that survive
                // both the branch and the fall-through.
                let snapshot = self.memory.clone();
                self.visit_block(&mut if_statement.body);
                self.memory
                    .retain(|key, value| snapshot.get(key).map(String::as_str) == Some(value.as_str()));
            }
            Statement::Switch(switch) => {
                self.visit_expression(&mut switch.expression);
                let snapshot = self.memory.clone();
                let mut merged = snapshot.clone();
                for case in &mut switch.cases {
                    self.memory = snapshot.clone();
                    self.visit_block(&mut case.body);
                    let branch = &self.memory;
                    merged.retain(|key, value| {
                        branch.get(key).map(String::as_str) == Some(value.as_str())
                    });
                }
                self.memory = merged;
            }
            Statement::ForLoop(for_loop) => {
                // The init block scope spans condition, body, and post
                self.scope.enter_block();
                for statement in &mut for_loop.pre.statements {
                    self.visit_statement(statement);
                }
                // Condition and body run once per iteration, post is also
                // reachable via continue: each starts with no assumptions.
                self.memory.clear();
                self.visit_expression(&mut for_loop.condition);
                self.visit_block(&mut for_loop.body);
                self.memory.clear();
                self.visit_block(&mut for_loop.post);
                self.memory.clear();
                self.scope.leave();
            }
            Statement::FunctionDefinition(function) => {
                // Function bodies execute at call sites, not here; they see
                // no tracked state and leave none behind.
                let outer = std::mem::take(&mut self.memory);
                self.scope.enter_function();
                for parameter in &function.parameters {
                    self.scope.declare(&parameter.name);
                    if self.ssa.contains(&parameter.name) {
                        self.define_variable(&parameter.name, None);
                    }
                }
                for ret in &function.returns {
                    self.scope.declare(&ret.name);
                    if self.ssa.contains(&ret.name) {
                        self.define_variable(&ret.name, None);
                    }
                }
                self.visit_block(&mut function.body);
                self.scope.leave();
                self.memory = outer;
            }
            Statement::Break(_) | Statement::Continue(_) | Statement::Leave(_) => {
                self.memory.clear();
            }
        }
    }

    fn visit_expression(&mut self, expression: &mut Expression) {
        let Expression::FunctionCall(call) = expression else {
            return;
        };
        // Arguments evaluate before the call itself
        for argument in &mut call.arguments {
            self.visit_expression(argument);
        }
        self.handle_call(call);
        if let Some(name) = self.load_replacement(call) {
            let span = call.span;
            *expression = Expression::Identifier(Identifier { name, span });
        }
    }

    /// The value variable to substitute for this call, if it is a tracked
    /// load and the value is still visible here
    fn load_replacement(&self, call: &FunctionCall) -> Option<String> {
        if call.function.name != self.dialect.memory_load_function() || call.arguments.len() != 1 {
            return None;
        }
        let Expression::Identifier(address) = &call.arguments[0] else {
            return None;
        };
        let value = self.memory.get(&address.name)?;
        if self.scope.is_in_scope(value) {
            Some(value.clone())
        } else {
            None
        }
    }

    /// Apply the memory effects of a call, then record it if it is a
    /// trackable store
    fn handle_call(&mut self, call: &FunctionCall) {
        let effects = match self.dialect.builtin(&call.function.name) {
            Some(builtin) => builtin.side_effects,
            None => self
                .function_effects
                .get(&call.function.name)
                .copied()
                .unwrap_or_else(SideEffects::worst),
        };
        if effects.invalidates_memory() {
            self.invalidate(call);
        }
        if call.function.name == self.dialect.memory_store_function() {
            if let [Expression::Identifier(address), Expression::Identifier(value)] =
                call.arguments.as_slice()
            {
                if self.ssa.contains(&address.name) && self.ssa.contains(&value.name) {
                    self.memory.insert(address.name.clone(), value.name.clone());
                }
            }
        }
    }

    /// Drop every tracked entry this memory write could touch. Writes with
    /// no known footprint drop everything.
    fn invalidate(&mut self, call: &FunctionCall) {
        let Some((start, length)) = self.write_footprint(call) else {
            self.memory.clear();
            return;
        };
        let tracked: Vec<String> = self.memory.keys().cloned().collect();
        for address in tracked {
            if self.may_overlap(&address, &start, &length) {
                self.memory.remove(&address);
            }
        }
    }

    /// The memory region `[start, start + length)` written by this call,
    /// encoded, or `None` when the written region is unknown
    fn write_footprint(&mut self, call: &FunctionCall) -> Option<(SmtExpr, SmtExpr)> {
        enum Length {
            Constant(u64),
            Argument(usize),
        }
        use Instruction::*;
        let instruction = self.dialect.builtin(&call.function.name)?.instruction?;
        let (start, length) = match instruction {
            CalldataCopy | CodeCopy | ReturnDataCopy => (0, Length::Argument(2)),
            ExtCodeCopy => (1, Length::Argument(3)),
            Mstore => (0, Length::Constant(WORD_SIZE)),
            Mstore8 => (0, Length::Constant(1)),
            // Output region of the call
            Call | CallCode => (5, Length::Argument(6)),
            DelegateCall | StaticCall => (4, Length::Argument(5)),
            _ => return None,
        };
        let start = self.encode_expression(call.arguments.get(start)?);
        let length = match length {
            Length::Constant(value) => SmtExpr::from(value),
            Length::Argument(index) => self.encode_expression(call.arguments.get(index)?),
        };
        Some((start, length))
    }

    /// Whether the word at the tracked address can intersect
    /// `[start, start + length)`. Proving disjointness means proving the
    /// hypothesis unsatisfiable for both the first and the last byte of
    /// the word.
    fn may_overlap(&mut self, tracked: &str, start: &SmtExpr, length: &SmtExpr) -> bool {
        let address = self
            .variables
            .get(tracked)
            .cloned()
            .expect("tracked address without solver variable");
        let last_byte = address.clone() + (WORD_SIZE - 1);
        for location in [address, last_byte] {
            self.solver.push();
            self.solver.add_assertion(SmtExpr::and(
                SmtExpr::le(start.clone(), location.clone()),
                SmtExpr::lt(location, start.clone() + length.clone()),
            ));
            let result = self.solver.check(&[]);
            self.solver.pop();
            if result != CheckResult::Unsatisfiable {
                return true;
            }
        }
        false
    }

    /// Declare the solver counterpart of a single-assignment variable,
    /// pinned to its encoded definition when one is given and to the word
    /// range otherwise.
    fn define_variable(&mut self, name: &str, value: Option<&Expression>) {
        let variable = self.solver.new_variable(&format!("yul_{name}"), Sort::Int);
        let previous = self.variables.insert(name.to_string(), variable.clone());
        assert!(previous.is_none(), "variable {name} declared twice");
        let definition = match value {
            Some(expression) => self.encode_expression(expression),
            None => self.new_restricted_variable(word_modulus()),
        };
        self.solver.add_assertion(SmtExpr::eq(variable, definition));
    }

    fn encode_expression(&mut self, expression: &Expression) -> SmtExpr {
        match expression {
            Expression::Literal(literal) => SmtExpr::Const(literal.value.clone()),
            Expression::Identifier(identifier) => match self.variables.get(&identifier.name) {
                Some(variable) => variable.clone(),
                None => self.new_restricted_variable(word_modulus()),
            },
            Expression::FunctionCall(call) => self.encode_call(call),
        }
    }

    fn encode_call(&mut self, call: &FunctionCall) -> SmtExpr {
        let Some(instruction) = self
            .dialect
            .builtin(&call.function.name)
            .and_then(|builtin| builtin.instruction)
        else {
            return self.new_restricted_variable(word_modulus());
        };
        match instruction {
            Instruction::Add if call.arguments.len() == 2 => {
                let lhs = self.encode_expression(&call.arguments[0]);
                let rhs = self.encode_expression(&call.arguments[1]);
                self.wrap(lhs + rhs)
            }
            Instruction::CalldataSize
            | Instruction::CodeSize
            | Instruction::ExtCodeSize
            | Instruction::Msize
            | Instruction::ReturnDataSize => {
                self.new_restricted_variable(max_environment_data_size())
            }
            _ => self.new_restricted_variable(word_modulus()),
        }
    }

    /// Reduce `value` modulo `2^256`: the result is a fresh word-ranged
    /// variable related to `value` through an unknown quotient
    fn wrap(&mut self, value: SmtExpr) -> SmtExpr {
        let result = self.new_restricted_variable(word_modulus());
        let quotient = self.fresh_variable();
        self.solver.add_assertion(SmtExpr::eq(
            value,
            quotient * SmtExpr::from(word_modulus()) + result.clone(),
        ));
        result
    }

    /// A fresh variable constrained to `[0, bound)`
    fn new_restricted_variable(&mut self, bound: BigInt) -> SmtExpr {
        let variable = self.fresh_variable();
        self.solver
            .add_assertion(SmtExpr::le(SmtExpr::from(0u64), variable.clone()));
        self.solver
            .add_assertion(SmtExpr::lt(variable.clone(), SmtExpr::Const(bound)));
        variable
    }

    fn fresh_variable(&mut self) -> SmtExpr {
        self.counter += 1;
        self.solver
            .new_variable(&format!("expr_{}", self.counter), Sort::Int)
    }
}
