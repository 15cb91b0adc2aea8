//! Canonical single-line printing of the AST
//!
//! The output is valid Yul and stable, so tests can compare optimized
//! programs as strings.

use std::fmt;

use super::{Block, Case, Expression, Statement};

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return write!(f, "{{ }}");
        }
        write!(f, "{{ ")?;
        for statement in &self.statements {
            write!(f, "{statement} ")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Block(block) => write!(f, "{block}"),
            Statement::VariableDeclaration(decl) => {
                write!(f, "let ")?;
                write_names(f, &decl.variables)?;
                if let Some(value) = &decl.value {
                    write!(f, " := {value}")?;
                }
                Ok(())
            }
            Statement::Assignment(assignment) => {
                write_names(f, &assignment.targets)?;
                write!(f, " := {}", assignment.value)
            }
            Statement::Expression(expression) => write!(f, "{expression}"),
            Statement::If(if_statement) => {
                write!(f, "if {} {}", if_statement.condition, if_statement.body)
            }
            Statement::Switch(switch) => {
                write!(f, "switch {}", switch.expression)?;
                for case in &switch.cases {
                    write!(f, " {case}")?;
                }
                Ok(())
            }
            Statement::ForLoop(for_loop) => write!(
                f,
                "for {} {} {} {}",
                for_loop.pre, for_loop.condition, for_loop.post, for_loop.body
            ),
            Statement::FunctionDefinition(function) => {
                write!(f, "function {}(", function.name.name)?;
                write_names(f, &function.parameters)?;
                write!(f, ")")?;
                if !function.returns.is_empty() {
                    write!(f, " -> ")?;
                    write_names(f, &function.returns)?;
                }
                write!(f, " {}", function.body)
            }
            Statement::Break(_) => write!(f, "break"),
            Statement::Continue(_) => write!(f, "continue"),
            Statement::Leave(_) => write!(f, "leave"),
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(literal) => write!(f, "case {} {}", literal.value, self.body),
            None => write!(f, "default {}", self.body),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{}", literal.value),
            Expression::Identifier(identifier) => write!(f, "{}", identifier.name),
            Expression::FunctionCall(call) => {
                write!(f, "{}(", call.function.name)?;
                for (i, argument) in call.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn write_names(f: &mut fmt::Formatter<'_>, names: &[super::Identifier]) -> fmt::Result {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", name.name)?;
    }
    Ok(())
}
