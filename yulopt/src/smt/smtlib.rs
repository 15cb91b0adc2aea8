//! External solver backend speaking SMT-LIB2
//!
//! Renders the assertion stack as an SMT-LIB2 script and pipes it through a
//! `z3` binary. Spawn failures, timeouts, and unparseable output all come
//! back as `Unknown`, which callers treat as "cannot prove".

use std::io::Write;
use std::process::{Command, Stdio};

use num_traits::Signed;

use super::{CheckResult, SmtExpr, Solver, Sort};

pub struct Z3Solver {
    path: String,
    timeout_ms: u64,
    variables: Vec<(String, Sort)>,
    assertions: Vec<SmtExpr>,
    scopes: Vec<usize>,
}

impl Z3Solver {
    pub fn new() -> Self {
        Self::with_path("z3")
    }

    pub fn with_path(path: &str) -> Self {
        Z3Solver {
            path: path.to_string(),
            timeout_ms: 10_000,
            variables: Vec::new(),
            assertions: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Whether the configured binary can be spawned at all
    pub fn is_available(&self) -> bool {
        Command::new(&self.path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn render_script(&self, assumptions: &[SmtExpr]) -> String {
        let mut script = String::new();
        for (name, sort) in &self.variables {
            let sort = match sort {
                Sort::Int => "Int",
                Sort::Bool => "Bool",
            };
            script.push_str(&format!("(declare-const |{name}| {sort})\n"));
        }
        for assertion in self.assertions.iter().chain(assumptions) {
            script.push_str("(assert ");
            self.render_expr(assertion, &mut script);
            script.push_str(")\n");
        }
        script.push_str("(check-sat)\n");
        script
    }

    fn render_expr(&self, expr: &SmtExpr, out: &mut String) {
        match expr {
            SmtExpr::Const(value) => {
                if value.is_negative() {
                    out.push_str(&format!("(- {})", value.magnitude()));
                } else {
                    out.push_str(&value.to_string());
                }
            }
            SmtExpr::Var(id) => {
                let (name, _) = &self.variables[*id as usize];
                out.push_str(&format!("|{name}|"));
            }
            SmtExpr::Add(lhs, rhs) => self.render_binary("+", lhs, rhs, out),
            SmtExpr::Sub(lhs, rhs) => self.render_binary("-", lhs, rhs, out),
            SmtExpr::Mul(lhs, rhs) => self.render_binary("*", lhs, rhs, out),
            SmtExpr::Le(lhs, rhs) => self.render_binary("<=", lhs, rhs, out),
            SmtExpr::Lt(lhs, rhs) => self.render_binary("<", lhs, rhs, out),
            SmtExpr::Eq(lhs, rhs) => self.render_binary("=", lhs, rhs, out),
            SmtExpr::And(lhs, rhs) => self.render_binary("and", lhs, rhs, out),
        }
    }

    fn render_binary(&self, op: &str, lhs: &SmtExpr, rhs: &SmtExpr, out: &mut String) {
        out.push('(');
        out.push_str(op);
        out.push(' ');
        self.render_expr(lhs, out);
        out.push(' ');
        self.render_expr(rhs, out);
        out.push(')');
    }
}

impl Default for Z3Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for Z3Solver {
    fn new_variable(&mut self, name: &str, sort: Sort) -> SmtExpr {
        let id = self.variables.len() as u32;
        self.variables.push((name.to_string(), sort));
        SmtExpr::Var(id)
    }

    fn add_assertion(&mut self, assertion: SmtExpr) {
        self.assertions.push(assertion);
    }

    fn push(&mut self) {
        self.scopes.push(self.assertions.len());
    }

    // Declarations stay across pops; only assertions are scoped. Expressions
    // created in an inner scope thus remain valid after the pop.
    fn pop(&mut self) {
        let mark = self.scopes.pop().expect("pop without matching push");
        self.assertions.truncate(mark);
    }

    fn check(&mut self, assumptions: &[SmtExpr]) -> CheckResult {
        let script = self.render_script(assumptions);
        let child = Command::new(&self.path)
            .arg("-in")
            .arg(format!("-t:{}", self.timeout_ms))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn();
        let Ok(mut child) = child else {
            return CheckResult::Unknown;
        };
        if let Some(stdin) = child.stdin.as_mut() {
            if stdin.write_all(script.as_bytes()).is_err() {
                // Reap the child before giving up, or it lingers as a
                // zombie for the rest of the process lifetime.
                let _ = child.kill();
                let _ = child.wait();
                return CheckResult::Unknown;
            }
        }
        let Ok(output) = child.wait_with_output() else {
            return CheckResult::Unknown;
        };
        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            match line.trim() {
                "sat" => return CheckResult::Satisfiable,
                "unsat" => return CheckResult::Unsatisfiable,
                _ => {}
            }
        }
        CheckResult::Unknown
    }
}
