//! Solver interface used by the optimizer
//!
//! The optimizer talks to a constraint solver through the narrow [`Solver`]
//! trait: declare integer variables, assert facts, and run scoped
//! satisfiability checks. Two backends implement it: [`LinearSolver`], a
//! built-in decision procedure for the linear fragment the optimizer
//! actually emits, and [`Z3Solver`], which shells out to a `z3` binary
//! speaking SMT-LIB2.

mod linear;
mod smtlib;

pub use linear::LinearSolver;
pub use smtlib::Z3Solver;

use num_bigint::BigInt;

/// Solver-level types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Int,
    Bool,
}

/// Outcome of a satisfiability check.
///
/// `Unknown` (timeout, nonlinear input, resource limit) must be treated by
/// callers exactly like `Satisfiable`: as "cannot prove".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    Satisfiable,
    Unsatisfiable,
    Unknown,
}

/// Solver expression tree.
///
/// Arithmetic operators are overloaded so encoding code reads like the
/// arithmetic it models; comparisons are built with the named constructors
/// and are `Bool`-sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtExpr {
    Const(BigInt),
    Var(u32),
    Add(Box<SmtExpr>, Box<SmtExpr>),
    Sub(Box<SmtExpr>, Box<SmtExpr>),
    Mul(Box<SmtExpr>, Box<SmtExpr>),
    Le(Box<SmtExpr>, Box<SmtExpr>),
    Lt(Box<SmtExpr>, Box<SmtExpr>),
    Eq(Box<SmtExpr>, Box<SmtExpr>),
    And(Box<SmtExpr>, Box<SmtExpr>),
}

impl SmtExpr {
    pub fn le(lhs: SmtExpr, rhs: SmtExpr) -> SmtExpr {
        SmtExpr::Le(Box::new(lhs), Box::new(rhs))
    }

    pub fn lt(lhs: SmtExpr, rhs: SmtExpr) -> SmtExpr {
        SmtExpr::Lt(Box::new(lhs), Box::new(rhs))
    }

    pub fn eq(lhs: SmtExpr, rhs: SmtExpr) -> SmtExpr {
        SmtExpr::Eq(Box::new(lhs), Box::new(rhs))
    }

    pub fn and(lhs: SmtExpr, rhs: SmtExpr) -> SmtExpr {
        SmtExpr::And(Box::new(lhs), Box::new(rhs))
    }
}

impl From<BigInt> for SmtExpr {
    fn from(value: BigInt) -> Self {
        SmtExpr::Const(value)
    }
}

impl From<u64> for SmtExpr {
    fn from(value: u64) -> Self {
        SmtExpr::Const(BigInt::from(value))
    }
}

impl std::ops::Add for SmtExpr {
    type Output = SmtExpr;
    fn add(self, rhs: SmtExpr) -> SmtExpr {
        SmtExpr::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Add<u64> for SmtExpr {
    type Output = SmtExpr;
    fn add(self, rhs: u64) -> SmtExpr {
        self + SmtExpr::from(rhs)
    }
}

impl std::ops::Sub for SmtExpr {
    type Output = SmtExpr;
    fn sub(self, rhs: SmtExpr) -> SmtExpr {
        SmtExpr::Sub(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for SmtExpr {
    type Output = SmtExpr;
    fn mul(self, rhs: SmtExpr) -> SmtExpr {
        SmtExpr::Mul(Box::new(self), Box::new(rhs))
    }
}

/// A scoped, incremental solver session.
///
/// `push`/`pop` delimit hypothesis scopes; every proof obligation must be
/// issued inside its own scope so assertions never leak between queries.
pub trait Solver {
    /// Declare a fresh variable and return a reference to it
    fn new_variable(&mut self, name: &str, sort: Sort) -> SmtExpr;

    /// Assert a `Bool`-sorted expression in the current scope
    fn add_assertion(&mut self, assertion: SmtExpr);

    fn push(&mut self);

    fn pop(&mut self);

    /// Check satisfiability of the assertion stack plus `assumptions`
    fn check(&mut self, assumptions: &[SmtExpr]) -> CheckResult;
}
