//! Dependency-ordered task scheduling.
//!
//! Kahn's algorithm with a priority heap so ready tasks dispatch highest
//! priority first and ties break on task id for a deterministic order.
//! Cycles and unknown dependencies never abort a workflow: the affected
//! remainder is appended by priority after a warning, so execution always
//! terminates with every task scheduled exactly once.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use tracing::warn;

use opsforge_types::task::AgentTask;

/// Produce the execution order for a task list.
pub fn execution_order(tasks: &[AgentTask]) -> Vec<AgentTask> {
    let index: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();

    // Edge dep -> task. Unknown dependency ids get a warning and are
    // treated as already satisfied.
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
    for (i, task) in tasks.iter().enumerate() {
        graph.add_node(i);
        for dep in &task.dependencies {
            match index.get(dep.as_str()) {
                Some(&d) => {
                    graph.add_edge(d, i, ());
                }
                None => {
                    warn!(task = %task.id, dependency = %dep, "unknown dependency, treating as satisfied");
                }
            }
        }
    }

    if is_cyclic_directed(&graph) {
        warn!("dependency cycle detected, remaining tasks will run in priority order");
    }

    let mut in_degree: Vec<usize> = (0..tasks.len())
        .map(|i| graph.neighbors_directed(i, petgraph::Direction::Incoming).count())
        .collect();

    // Max-heap keyed on (priority, id ascending) for deterministic ties.
    let mut ready: BinaryHeap<(opsforge_types::task::TaskPriority, Reverse<&str>, usize)> =
        BinaryHeap::new();
    for (i, task) in tasks.iter().enumerate() {
        if in_degree[i] == 0 {
            ready.push((task.priority, Reverse(task.id.as_str()), i));
        }
    }

    let mut order = Vec::with_capacity(tasks.len());
    let mut scheduled = vec![false; tasks.len()];
    while let Some((_, _, i)) = ready.pop() {
        scheduled[i] = true;
        order.push(tasks[i].clone());
        for next in graph.neighbors_directed(i, petgraph::Direction::Outgoing) {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push((tasks[next].priority, Reverse(tasks[next].id.as_str()), next));
            }
        }
    }

    // Anything left sits on a cycle. Append by priority so the workflow
    // still covers every task.
    if order.len() < tasks.len() {
        let mut remainder: Vec<&AgentTask> = tasks
            .iter()
            .enumerate()
            .filter(|(i, _)| !scheduled[*i])
            .map(|(_, t)| t)
            .collect();
        remainder.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
        order.extend(remainder.into_iter().cloned());
    }

    order
}
