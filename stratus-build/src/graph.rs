//! Deterministic dependency ordering.
//!
//! Kahn's algorithm with the ready set kept sorted, so equal inputs always
//! produce equal orders. Edges to names outside the graph are treated as
//! already satisfied. When ordering stalls, a depth-first search over the
//! remaining nodes recovers one concrete cycle for the error.

use std::collections::{BTreeMap, BTreeSet};

use crate::{CycleError, CycleNode, SourceLocation};

#[derive(Debug, Default)]
struct Node {
    location: Option<SourceLocation>,
    /// Names this node depends on.
    deps: BTreeSet<String>,
}

/// A set of named nodes and "depends on" edges between them.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, Node>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; re-adding keeps existing edges and updates the location.
    pub fn add_node(&mut self, name: impl Into<String>, location: Option<SourceLocation>) {
        let node = self.nodes.entry(name.into()).or_default();
        if location.is_some() {
            node.location = location;
        }
    }

    /// Record that `from` depends on `to`.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.nodes
            .entry(from.into())
            .or_default()
            .deps
            .insert(to.into());
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Dependencies first; ties broken lexicographically.
    pub fn order(&self) -> Result<Vec<String>, CycleError> {
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for (name, node) in &self.nodes {
            let mut degree = 0;
            for dep in &node.deps {
                if self.nodes.contains_key(dep) {
                    degree += 1;
                    dependents.entry(dep.as_str()).or_default().push(name);
                } else {
                    tracing::debug!(from = %name, to = %dep, "ignoring edge to external name");
                }
            }
            in_degree.insert(name, degree);
        }

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(name) = ready.pop_first() {
            order.push(name.to_string());
            for dependent in dependents.get(name).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            return Ok(order);
        }

        let remaining: BTreeSet<&str> = in_degree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(name, _)| name)
            .collect();
        Err(self.find_cycle(&remaining))
    }

    /// Find one cycle among `remaining`, which must all be unordered.
    fn find_cycle(&self, remaining: &BTreeSet<&str>) -> CycleError {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            graph: &'a DependencyGraph,
            remaining: &BTreeSet<&str>,
            name: &'a str,
            marks: &mut BTreeMap<&'a str, Mark>,
            stack: &mut Vec<&'a str>,
        ) -> Option<Vec<&'a str>> {
            marks.insert(name, Mark::Visiting);
            stack.push(name);
            if let Some(node) = graph.nodes.get(name) {
                for dep in &node.deps {
                    let dep = dep.as_str();
                    if !remaining.contains(dep) {
                        continue;
                    }
                    match marks.get(dep) {
                        Some(Mark::Visiting) => {
                            let start = stack.iter().position(|n| *n == dep).unwrap_or(0);
                            return Some(stack[start..].to_vec());
                        }
                        Some(Mark::Done) => {}
                        None => {
                            if let Some(cycle) = visit(graph, remaining, dep, marks, stack) {
                                return Some(cycle);
                            }
                        }
                    }
                }
            }
            stack.pop();
            marks.insert(name, Mark::Done);
            None
        }

        let mut marks = BTreeMap::new();
        let mut stack = Vec::new();
        let mut cycle = Vec::new();
        for &start in remaining {
            if marks.contains_key(start) {
                continue;
            }
            if let Some(found) = visit(self, remaining, start, &mut marks, &mut stack) {
                cycle = found;
                break;
            }
            stack.clear();
        }

        CycleError {
            path: cycle
                .into_iter()
                .map(|name| CycleNode {
                    name: name.to_string(),
                    location: self.nodes.get(name).and_then(|n| n.location.clone()),
                })
                .collect(),
        }
    }
}
