//! Built-in decision procedure for linear integer arithmetic
//!
//! Decides conjunctions of linear constraints with constant coefficients:
//! exactly the fragment the symbolic encoder emits (variable definitions,
//! range restrictions, word-wrap equations, and footprint-overlap
//! hypotheses). Equalities are eliminated by substitution, the rest by
//! Fourier-Motzkin with integer bound tightening, so an `Unsatisfiable`
//! answer is a valid proof over the integers. Anything outside the fragment
//! degrades to `Unknown`.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use super::{CheckResult, SmtExpr, Solver, Sort};

/// Cap on derived constraints before a query gives up with `Unknown`
const CONSTRAINT_LIMIT: usize = 5_000;

/// In-process solver backend
#[derive(Debug, Default)]
pub struct LinearSolver {
    variables: Vec<String>,
    assertions: Vec<SmtExpr>,
    scopes: Vec<usize>,
}

impl LinearSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Solver for LinearSolver {
    fn new_variable(&mut self, name: &str, _sort: Sort) -> SmtExpr {
        let id = self.variables.len() as u32;
        self.variables.push(name.to_string());
        SmtExpr::Var(id)
    }

    fn add_assertion(&mut self, assertion: SmtExpr) {
        self.assertions.push(assertion);
    }

    fn push(&mut self) {
        self.scopes.push(self.assertions.len());
    }

    fn pop(&mut self) {
        let mark = self.scopes.pop().expect("pop without matching push");
        self.assertions.truncate(mark);
    }

    fn check(&mut self, assumptions: &[SmtExpr]) -> CheckResult {
        let mut constraints = Vec::new();
        for assertion in self.assertions.iter().chain(assumptions) {
            if collect_constraints(assertion, &mut constraints).is_none() {
                return CheckResult::Unknown;
            }
        }
        decide(constraints)
    }
}

/// Linear expression: `sum(coefficient * variable) + constant`
#[derive(Debug, Clone, PartialEq, Eq)]
struct LinExpr {
    terms: BTreeMap<u32, BigInt>,
    constant: BigInt,
}

impl LinExpr {
    fn zero() -> Self {
        LinExpr {
            terms: BTreeMap::new(),
            constant: BigInt::zero(),
        }
    }

    fn constant(value: BigInt) -> Self {
        LinExpr {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    fn variable(id: u32) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(id, BigInt::one());
        LinExpr {
            terms,
            constant: BigInt::zero(),
        }
    }

    /// `self += factor * other`
    fn add_scaled(&mut self, other: &LinExpr, factor: &BigInt) {
        if factor.is_zero() {
            return;
        }
        for (id, coefficient) in &other.terms {
            let entry = self.terms.entry(*id).or_insert_with(BigInt::zero);
            *entry += factor * coefficient;
            if entry.is_zero() {
                self.terms.remove(id);
            }
        }
        self.constant += factor * &other.constant;
    }

    fn scaled(&self, factor: &BigInt) -> LinExpr {
        let mut result = LinExpr::zero();
        result.add_scaled(self, factor);
        result
    }
}

/// `expr <= 0` or `expr == 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    LessEq,
    Equal,
}

#[derive(Debug, Clone)]
struct Constraint {
    expr: LinExpr,
    relation: Relation,
}

fn linearize(expr: &SmtExpr) -> Option<LinExpr> {
    match expr {
        SmtExpr::Const(value) => Some(LinExpr::constant(value.clone())),
        SmtExpr::Var(id) => Some(LinExpr::variable(*id)),
        SmtExpr::Add(lhs, rhs) => {
            let mut result = linearize(lhs)?;
            result.add_scaled(&linearize(rhs)?, &BigInt::one());
            Some(result)
        }
        SmtExpr::Sub(lhs, rhs) => {
            let mut result = linearize(lhs)?;
            result.add_scaled(&linearize(rhs)?, &-BigInt::one());
            Some(result)
        }
        SmtExpr::Mul(lhs, rhs) => {
            let left = linearize(lhs)?;
            let right = linearize(rhs)?;
            if left.terms.is_empty() {
                Some(right.scaled(&left.constant))
            } else if right.terms.is_empty() {
                Some(left.scaled(&right.constant))
            } else {
                // Nonlinear
                None
            }
        }
        SmtExpr::Le(..) | SmtExpr::Lt(..) | SmtExpr::Eq(..) | SmtExpr::And(..) => None,
    }
}

fn collect_constraints(expr: &SmtExpr, out: &mut Vec<Constraint>) -> Option<()> {
    match expr {
        SmtExpr::And(lhs, rhs) => {
            collect_constraints(lhs, out)?;
            collect_constraints(rhs, out)
        }
        SmtExpr::Le(lhs, rhs) => {
            out.push(difference(lhs, rhs, BigInt::zero(), Relation::LessEq)?);
            Some(())
        }
        SmtExpr::Lt(lhs, rhs) => {
            // Over integers `a < b` is `a - b + 1 <= 0`
            out.push(difference(lhs, rhs, BigInt::one(), Relation::LessEq)?);
            Some(())
        }
        SmtExpr::Eq(lhs, rhs) => {
            out.push(difference(lhs, rhs, BigInt::zero(), Relation::Equal)?);
            Some(())
        }
        _ => None,
    }
}

fn difference(
    lhs: &SmtExpr,
    rhs: &SmtExpr,
    offset: BigInt,
    relation: Relation,
) -> Option<Constraint> {
    let mut expr = linearize(lhs)?;
    expr.add_scaled(&linearize(rhs)?, &-BigInt::one());
    expr.constant += offset;
    Some(Constraint { expr, relation })
}

enum Normalized {
    Unsat,
    Constraints(Vec<Constraint>),
}

/// Evaluate ground constraints and apply gcd-based integer tightening
fn normalize(constraints: Vec<Constraint>) -> Normalized {
    let mut result = Vec::with_capacity(constraints.len());
    for mut constraint in constraints {
        if constraint.expr.terms.is_empty() {
            let violated = match constraint.relation {
                Relation::LessEq => constraint.expr.constant.is_positive(),
                Relation::Equal => !constraint.expr.constant.is_zero(),
            };
            if violated {
                return Normalized::Unsat;
            }
            continue;
        }
        let gcd = constraint
            .expr
            .terms
            .values()
            .fold(BigInt::zero(), |acc, coefficient| acc.gcd(coefficient));
        if gcd > BigInt::one() {
            match constraint.relation {
                Relation::Equal => {
                    if !constraint.expr.constant.is_multiple_of(&gcd) {
                        return Normalized::Unsat;
                    }
                    constraint.expr.constant /= &gcd;
                }
                Relation::LessEq => {
                    // terms/g <= -c/g, rounded down for integers
                    let bound = (-&constraint.expr.constant).div_floor(&gcd);
                    constraint.expr.constant = -bound;
                }
            }
            for coefficient in constraint.expr.terms.values_mut() {
                *coefficient /= &gcd;
            }
        }
        result.push(constraint);
    }
    Normalized::Constraints(result)
}

/// A variable with coefficient +1 or -1 in the constraint, if any
fn unit_variable(constraint: &Constraint) -> Option<(u32, BigInt)> {
    constraint
        .expr
        .terms
        .iter()
        .find(|(_, coefficient)| coefficient.abs().is_one())
        .map(|(id, coefficient)| (*id, coefficient.clone()))
}

/// Variable occurring in the fewest constraints
fn choose_variable(constraints: &[Constraint]) -> Option<u32> {
    let mut occurrences: BTreeMap<u32, usize> = BTreeMap::new();
    for constraint in constraints {
        for id in constraint.expr.terms.keys() {
            *occurrences.entry(*id).or_insert(0) += 1;
        }
    }
    occurrences
        .into_iter()
        .min_by_key(|(_, count)| *count)
        .map(|(id, _)| id)
}

fn decide(constraints: Vec<Constraint>) -> CheckResult {
    let mut constraints = constraints;
    loop {
        constraints = match normalize(constraints) {
            Normalized::Unsat => return CheckResult::Unsatisfiable,
            Normalized::Constraints(normalized) => normalized,
        };

        // Eliminate an equality by substitution where a +-1 pivot exists;
        // substitution with a unit pivot is exact over the integers.
        if let Some(index) = constraints
            .iter()
            .position(|c| c.relation == Relation::Equal && unit_variable(c).is_some())
        {
            let equality = constraints.swap_remove(index);
            let (variable, coefficient) = unit_variable(&equality).expect("pivot vanished");
            let mut solution = equality.expr.clone();
            solution.terms.remove(&variable);
            // a*x + rest == 0, a = +-1  =>  x == -a * rest
            let solution = solution.scaled(&-coefficient);
            for constraint in &mut constraints {
                if let Some(factor) = constraint.expr.terms.remove(&variable) {
                    constraint.expr.add_scaled(&solution, &factor);
                }
            }
            continue;
        }

        // Remaining equalities have no unit pivot: split into two bounds
        if let Some(index) = constraints
            .iter()
            .position(|c| c.relation == Relation::Equal)
        {
            let equality = constraints.swap_remove(index);
            constraints.push(Constraint {
                expr: equality.expr.scaled(&-BigInt::one()),
                relation: Relation::LessEq,
            });
            constraints.push(Constraint {
                expr: equality.expr,
                relation: Relation::LessEq,
            });
            continue;
        }

        // Only inequalities left: Fourier-Motzkin elimination
        let Some(variable) = choose_variable(&constraints) else {
            return CheckResult::Satisfiable;
        };
        let mut lowers = Vec::new();
        let mut uppers = Vec::new();
        let mut rest = Vec::new();
        for constraint in constraints {
            match constraint.expr.terms.get(&variable) {
                Some(coefficient) if coefficient.is_negative() => lowers.push(constraint),
                Some(_) => uppers.push(constraint),
                None => rest.push(constraint),
            }
        }
        for lower in &lowers {
            let a = lower.expr.terms[&variable].clone();
            for upper in &uppers {
                let b = upper.expr.terms[&variable].clone();
                let mut expr = lower.expr.scaled(&b);
                expr.add_scaled(&upper.expr, &-&a);
                debug_assert!(!expr.terms.contains_key(&variable));
                rest.push(Constraint {
                    expr,
                    relation: Relation::LessEq,
                });
            }
        }
        if rest.len() > CONSTRAINT_LIMIT {
            return CheckResult::Unknown;
        }
        constraints = rest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smt::{CheckResult, SmtExpr, Solver, Sort};

    fn var(solver: &mut LinearSolver, name: &str) -> SmtExpr {
        solver.new_variable(name, Sort::Int)
    }

    fn constant(value: i64) -> SmtExpr {
        SmtExpr::Const(BigInt::from(value))
    }

    #[test]
    fn test_empty_is_sat() {
        let mut solver = LinearSolver::new();
        assert_eq!(solver.check(&[]), CheckResult::Satisfiable);
    }

    #[test]
    fn test_contradictory_bounds() {
        let mut solver = LinearSolver::new();
        let x = var(&mut solver, "x");
        solver.add_assertion(SmtExpr::eq(x.clone(), constant(0)));
        solver.add_assertion(SmtExpr::le(constant(1), x));
        assert_eq!(solver.check(&[]), CheckResult::Unsatisfiable);
    }

    #[test]
    fn test_satisfiable_interval() {
        let mut solver = LinearSolver::new();
        let x = var(&mut solver, "x");
        solver.add_assertion(SmtExpr::le(constant(0), x.clone()));
        solver.add_assertion(SmtExpr::le(x, constant(10)));
        assert_eq!(solver.check(&[]), CheckResult::Satisfiable);
    }

    #[test]
    fn test_no_integer_between_zero_and_one() {
        // 0 < x < 1 is satisfiable over the rationals but not the integers
        let mut solver = LinearSolver::new();
        let x = var(&mut solver, "x");
        solver.add_assertion(SmtExpr::lt(constant(0), x.clone()));
        solver.add_assertion(SmtExpr::lt(x, constant(1)));
        assert_eq!(solver.check(&[]), CheckResult::Unsatisfiable);
    }

    #[test]
    fn test_wraparound_equation() {
        // 32 == q * 2^256 + r, 0 <= r < 2^256, r <= 0: forces q >= 1 and
        // q <= 0 at once. Needs integer tightening of the scaled bounds.
        let mut solver = LinearSolver::new();
        let q = var(&mut solver, "q");
        let r = var(&mut solver, "r");
        let modulus = SmtExpr::Const(BigInt::from(1u8) << 256);
        solver.add_assertion(SmtExpr::eq(
            constant(32),
            q * modulus.clone() + r.clone(),
        ));
        solver.add_assertion(SmtExpr::le(constant(0), r.clone()));
        solver.add_assertion(SmtExpr::lt(r.clone(), modulus));
        assert_eq!(solver.check(&[]), CheckResult::Satisfiable);
        assert_eq!(
            solver.check(&[SmtExpr::le(r, constant(0))]),
            CheckResult::Unsatisfiable
        );
    }

    #[test]
    fn test_push_pop_isolation() {
        let mut solver = LinearSolver::new();
        let x = var(&mut solver, "x");
        solver.add_assertion(SmtExpr::eq(x.clone(), constant(5)));
        solver.push();
        solver.add_assertion(SmtExpr::le(x.clone(), constant(0)));
        assert_eq!(solver.check(&[]), CheckResult::Unsatisfiable);
        solver.pop();
        assert_eq!(solver.check(&[]), CheckResult::Satisfiable);
        // The popped hypothesis must not constrain later checks
        assert_eq!(
            solver.check(&[SmtExpr::le(constant(5), x)]),
            CheckResult::Satisfiable
        );
    }

    #[test]
    fn test_nonlinear_is_unknown() {
        let mut solver = LinearSolver::new();
        let x = var(&mut solver, "x");
        let y = var(&mut solver, "y");
        solver.add_assertion(SmtExpr::eq(x * y, constant(4)));
        assert_eq!(solver.check(&[]), CheckResult::Unknown);
    }

    #[test]
    fn test_chained_equalities() {
        let mut solver = LinearSolver::new();
        let x = var(&mut solver, "x");
        let y = var(&mut solver, "y");
        let z = var(&mut solver, "z");
        solver.add_assertion(SmtExpr::eq(x.clone(), constant(3)));
        solver.add_assertion(SmtExpr::eq(y.clone(), x + constant(4)));
        solver.add_assertion(SmtExpr::eq(z.clone(), y));
        assert_eq!(
            solver.check(&[SmtExpr::eq(z.clone(), constant(7))]),
            CheckResult::Satisfiable
        );
        assert_eq!(
            solver.check(&[SmtExpr::lt(z, constant(7))]),
            CheckResult::Unsatisfiable
        );
    }

    #[test]
    fn test_conjunction_assertion() {
        let mut solver = LinearSolver::new();
        let x = var(&mut solver, "x");
        solver.add_assertion(SmtExpr::and(
            SmtExpr::le(constant(0), x.clone()),
            SmtExpr::lt(x.clone(), constant(4)),
        ));
        assert_eq!(solver.check(&[]), CheckResult::Satisfiable);
        assert_eq!(
            solver.check(&[SmtExpr::le(constant(4), x)]),
            CheckResult::Unsatisfiable
        );
    }
}
