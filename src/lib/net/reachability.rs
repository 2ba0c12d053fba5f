use hashbrown::{HashMap, HashSet};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::net::{marking::Marking, transition::Transition, Place};

/// Depth-first enumeration of every marking reachable from `start` through
/// any finite firing sequence drawn from `transitions`, `start` included.
/// Operates purely on clones. Termination requires the transition set to
/// induce a finite state space; an infinite one makes this loop forever.
pub fn explore<P: Place>(start: Marking<P>, transitions: &[Transition<P>]) -> HashSet<Marking<P>> {
    let mut seen = HashSet::new();
    let mut stack = vec![start.clone()];
    seen.insert(start);

    while let Some(current) = stack.pop() {
        for transition in transitions {
            if !transition.is_enabled(&current) {
                continue;
            }
            let mut next = current.clone();
            transition.apply(&mut next);
            if seen.insert(next.clone()) {
                stack.push(next);
            }
        }
    }

    seen
}

/// Same exploration, but keeping the firing structure: nodes are the
/// reachable markings, every edge is one firing and its weight indexes into
/// `transitions`.
pub fn explore_graph<P: Place>(
    start: Marking<P>,
    transitions: &[Transition<P>],
) -> DiGraph<Marking<P>, usize> {
    let mut graph = DiGraph::new();
    let mut nodes: HashMap<Marking<P>, NodeIndex> = HashMap::new();

    let root = graph.add_node(start.clone());
    nodes.insert(start.clone(), root);
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        let from = nodes[&current];
        for (index, transition) in transitions.iter().enumerate() {
            if !transition.is_enabled(&current) {
                continue;
            }
            let mut next = current.clone();
            transition.apply(&mut next);
            let to = match nodes.get(&next) {
                Some(&node) => node,
                None => {
                    let node = graph.add_node(next.clone());
                    nodes.insert(next.clone(), node);
                    stack.push(next);
                    node
                }
            };
            graph.add_edge(from, to, index);
        }
    }

    graph
}
