//! Scope tracking for the optimizer traversal
//!
//! A stack of scope frames, owned and driven explicitly by the pass (no
//! traversal inheritance). Function scopes are barriers: Yul function
//! bodies cannot reference variables of the enclosing code.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct ScopeTracker {
    frames: Vec<Frame>,
}

#[derive(Debug)]
struct Frame {
    names: HashSet<String>,
    barrier: bool,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_block(&mut self) {
        self.frames.push(Frame {
            names: HashSet::new(),
            barrier: false,
        });
    }

    /// Enter a function body scope; lookups from inside stop here
    pub fn enter_function(&mut self) {
        self.frames.push(Frame {
            names: HashSet::new(),
            barrier: true,
        });
    }

    pub fn leave(&mut self) {
        let frame = self.frames.pop();
        assert!(frame.is_some(), "scope stack underflow");
    }

    /// Record a declaration in the innermost scope
    pub fn declare(&mut self, name: &str) {
        let frame = self
            .frames
            .last_mut()
            .expect("declaration outside any scope");
        frame.names.insert(name.to_string());
    }

    /// Whether `name` is visible at the current program point
    pub fn is_in_scope(&self, name: &str) -> bool {
        for frame in self.frames.iter().rev() {
            if frame.names.contains(name) {
                return true;
            }
            if frame.barrier {
                return false;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let mut scope = ScopeTracker::new();
        scope.enter_block();
        scope.declare("x");
        assert!(scope.is_in_scope("x"));
        assert!(!scope.is_in_scope("y"));
    }

    #[test]
    fn test_inner_scope_sees_outer() {
        let mut scope = ScopeTracker::new();
        scope.enter_block();
        scope.declare("x");
        scope.enter_block();
        assert!(scope.is_in_scope("x"));
    }

    #[test]
    fn test_leaving_scope_drops_names() {
        let mut scope = ScopeTracker::new();
        scope.enter_block();
        scope.enter_block();
        scope.declare("x");
        scope.leave();
        assert!(!scope.is_in_scope("x"));
    }

    #[test]
    fn test_function_barrier_hides_outer() {
        let mut scope = ScopeTracker::new();
        scope.enter_block();
        scope.declare("x");
        scope.enter_function();
        scope.declare("p");
        assert!(scope.is_in_scope("p"));
        assert!(!scope.is_in_scope("x"));
        scope.leave();
        assert!(scope.is_in_scope("x"));
    }
}
