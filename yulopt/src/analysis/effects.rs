//! Side-effect propagation over the call graph
//!
//! Computes, for every user-defined function, the join of the effects of
//! every builtin transitively reachable from it. Calls to names that are
//! neither builtins nor defined functions get the worst-case summary.

use std::collections::{HashMap, HashSet, VecDeque};

use super::CallGraph;
use crate::dialect::{EvmDialect, SideEffects};

/// Effect summary per user-defined function
pub fn function_side_effects(
    dialect: &EvmDialect,
    graph: &CallGraph,
) -> HashMap<String, SideEffects> {
    graph
        .functions()
        .map(|name| (name.clone(), reachable_effects(dialect, graph, name)))
        .collect()
}

fn reachable_effects(dialect: &EvmDialect, graph: &CallGraph, function: &str) -> SideEffects {
    let mut effects = SideEffects::none();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(function);
    seen.insert(function);

    while let Some(current) = queue.pop_front() {
        let Some(callees) = graph.callees(current) else {
            continue;
        };
        for callee in callees {
            if let Some(builtin) = dialect.builtin(callee) {
                effects = effects.join(builtin.side_effects);
            } else if graph.callees(callee).is_some() {
                if seen.insert(callee) {
                    queue.push_back(callee);
                }
            } else {
                // Unknown callee
                effects = effects.join(SideEffects::worst());
            }
        }
    }
    effects
}
