//! Read-only AST traversal
//!
//! Analyses implement [`Visit`] and override the hooks they care about;
//! the `walk_*` functions provide the default depth-first, program-order
//! descent.

use super::{Block, Expression, FunctionDefinition, Statement};

/// Read-only visitor with default full traversal
pub trait Visit {
    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement);
    }

    fn visit_expression(&mut self, expression: &Expression) {
        walk_expression(self, expression);
    }

    fn visit_function_definition(&mut self, function: &FunctionDefinition) {
        walk_function_definition(self, function);
    }
}

pub fn walk_block<V: Visit + ?Sized>(visitor: &mut V, block: &Block) {
    for statement in &block.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: Visit + ?Sized>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::Block(block) => visitor.visit_block(block),
        Statement::VariableDeclaration(decl) => {
            if let Some(value) = &decl.value {
                visitor.visit_expression(value);
            }
        }
        Statement::Assignment(assignment) => visitor.visit_expression(&assignment.value),
        Statement::Expression(expression) => visitor.visit_expression(expression),
        Statement::If(if_statement) => {
            visitor.visit_expression(&if_statement.condition);
            visitor.visit_block(&if_statement.body);
        }
        Statement::Switch(switch) => {
            visitor.visit_expression(&switch.expression);
            for case in &switch.cases {
                visitor.visit_block(&case.body);
            }
        }
        Statement::ForLoop(for_loop) => {
            visitor.visit_block(&for_loop.pre);
            visitor.visit_expression(&for_loop.condition);
            visitor.visit_block(&for_loop.post);
            visitor.visit_block(&for_loop.body);
        }
        Statement::FunctionDefinition(function) => visitor.visit_function_definition(function),
        Statement::Break(_) | Statement::Continue(_) | Statement::Leave(_) => {}
    }
}

pub fn walk_expression<V: Visit + ?Sized>(visitor: &mut V, expression: &Expression) {
    if let Expression::FunctionCall(call) = expression {
        for argument in &call.arguments {
            visitor.visit_expression(argument);
        }
    }
}

pub fn walk_function_definition<V: Visit + ?Sized>(
    visitor: &mut V,
    function: &FunctionDefinition,
) {
    visitor.visit_block(&function.body);
}
