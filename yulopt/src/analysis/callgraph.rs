//! Call graph construction

use std::collections::{BTreeSet, HashMap};

use crate::ast::{Block, Expression, FunctionDefinition, Visit, walk_expression,
    walk_function_definition};

/// Which names each function calls (builtins included). Calls made outside
/// any function definition are recorded under [`CallGraph::ROOT`].
#[derive(Debug, Default)]
pub struct CallGraph {
    pub calls: HashMap<String, BTreeSet<String>>,
}

impl CallGraph {
    /// Key for calls at the top level of the program
    pub const ROOT: &'static str = "";

    pub fn callees(&self, function: &str) -> Option<&BTreeSet<String>> {
        self.calls.get(function)
    }

    /// Names of all user-defined functions in the graph
    pub fn functions(&self) -> impl Iterator<Item = &String> {
        self.calls.keys().filter(|name| !name.is_empty())
    }
}

/// Build the call graph of `block`
pub fn call_graph(block: &Block) -> CallGraph {
    let mut builder = Builder {
        graph: CallGraph::default(),
        current: vec![CallGraph::ROOT.to_string()],
    };
    builder.graph.calls.insert(CallGraph::ROOT.to_string(), BTreeSet::new());
    builder.visit_block(block);
    builder.graph
}

struct Builder {
    graph: CallGraph,
    current: Vec<String>,
}

impl Visit for Builder {
    fn visit_expression(&mut self, expression: &Expression) {
        if let Expression::FunctionCall(call) = expression {
            let context = self.current.last().unwrap().clone();
            self.graph
                .calls
                .entry(context)
                .or_default()
                .insert(call.function.name.clone());
        }
        walk_expression(self, expression);
    }

    fn visit_function_definition(&mut self, function: &FunctionDefinition) {
        self.graph
            .calls
            .entry(function.name.name.clone())
            .or_default();
        self.current.push(function.name.name.clone());
        walk_function_definition(self, function);
        self.current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn graph(source: &str) -> CallGraph {
        let block = parse(source, tokenize(source).unwrap()).unwrap();
        call_graph(&block)
    }

    #[test]
    fn test_root_calls() {
        let g = graph("mstore(0, 1) let x := mload(0)");
        let root = g.callees(CallGraph::ROOT).unwrap();
        assert!(root.contains("mstore"));
        assert!(root.contains("mload"));
    }

    #[test]
    fn test_function_calls_attributed_to_definition() {
        let g = graph("function f() { sstore(0, 1) } f()");
        assert!(g.callees("f").unwrap().contains("sstore"));
        assert!(g.callees(CallGraph::ROOT).unwrap().contains("f"));
        assert!(!g.callees(CallGraph::ROOT).unwrap().contains("sstore"));
    }

    #[test]
    fn test_function_without_calls_has_entry() {
        let g = graph("function f() { let x := 1 }");
        assert!(g.callees("f").unwrap().is_empty());
    }

    #[test]
    fn test_nested_definitions() {
        let g = graph("function f() { function g() { mstore(0, 1) } g() }");
        assert!(g.callees("f").unwrap().contains("g"));
        assert!(g.callees("g").unwrap().contains("mstore"));
        assert!(!g.callees("f").unwrap().contains("mstore"));
    }
}
