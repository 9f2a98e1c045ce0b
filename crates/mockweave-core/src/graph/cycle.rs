use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::graph::dag::DependencyGraph;

/// A closed path in the model dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// Models along the cycle; the last one points back at the first.
    pub nodes: Vec<String>,
    #[serde(rename = "type")]
    pub cycle_type: CycleType,
    pub strength: CycleStrength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CycleType {
    SelfReference,
    SimpleCycle,
    ComplexCycle,
}

impl CycleType {
    pub fn from_len(len: usize) -> Self {
        match len {
            0 | 1 => CycleType::SelfReference,
            2 => CycleType::SimpleCycle,
            _ => CycleType::ComplexCycle,
        }
    }
}

impl fmt::Display for CycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleType::SelfReference => write!(f, "self-reference"),
            CycleType::SimpleCycle => write!(f, "simple-cycle"),
            CycleType::ComplexCycle => write!(f, "complex-cycle"),
        }
    }
}

/// Weak cycles contain at least one link that may be left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CycleStrength {
    Weak,
    Strong,
}

impl fmt::Display for CycleStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleStrength::Weak => write!(f, "weak"),
            CycleStrength::Strong => write!(f, "strong"),
        }
    }
}

impl Cycle {
    /// Consecutive `(from, to)` pairs, including the closing link.
    pub fn links(&self) -> Vec<(&str, &str)> {
        let n = self.nodes.len();
        (0..n)
            .map(|i| (self.nodes[i].as_str(), self.nodes[(i + 1) % n].as_str()))
            .collect()
    }

    pub fn contains(&self, model: &str) -> bool {
        self.nodes.iter().any(|n| n == model)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut path = self.nodes.join(" -> ");
        if let Some(first) = self.nodes.first() {
            path.push_str(" -> ");
            path.push_str(first);
        }
        write!(f, "{} ({}, {})", path, self.cycle_type, self.strength)
    }
}

/// Find cycles with a DFS that tracks the recursion stack.
///
/// Nodes are visited in model order and edges in insertion order. Every
/// back-edge (an edge to a node still on the stack) closes one cycle made of
/// the stack slice from that node. Edges in `removed` are ignored.
pub fn find_cycles(graph: &DependencyGraph, removed: &HashSet<EdgeIndex>) -> Vec<Cycle> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    struct Search<'a> {
        graph: &'a DependencyGraph,
        removed: &'a HashSet<EdgeIndex>,
        marks: Vec<Mark>,
        stack: Vec<NodeIndex>,
        cycles: Vec<Cycle>,
    }

    impl Search<'_> {
        fn visit(&mut self, node: NodeIndex) {
            self.marks[node.index()] = Mark::OnStack;
            self.stack.push(node);

            for edge in self.graph.outgoing(node, self.removed) {
                let target = edge.target();
                match self.marks[target.index()] {
                    Mark::Unvisited => self.visit(target),
                    Mark::OnStack => {
                        let start = self
                            .stack
                            .iter()
                            .position(|&n| n == target)
                            .unwrap_or(0);
                        let path = self.stack[start..].to_vec();
                        let cycle = self.build_cycle(&path);
                        self.cycles.push(cycle);
                    }
                    Mark::Done => {}
                }
            }

            self.stack.pop();
            self.marks[node.index()] = Mark::Done;
        }

        fn build_cycle(&self, path: &[NodeIndex]) -> Cycle {
            let n = path.len();
            let weak = (0..n).any(|i| {
                self.graph
                    .graph
                    .find_edge(path[i], path[(i + 1) % n])
                    .is_some_and(|e| self.graph.graph[e].is_optional())
            });
            Cycle {
                nodes: path
                    .iter()
                    .map(|&idx| self.graph.model_name(idx).to_string())
                    .collect(),
                cycle_type: CycleType::from_len(n),
                strength: if weak {
                    CycleStrength::Weak
                } else {
                    CycleStrength::Strong
                },
            }
        }
    }

    let mut search = Search {
        graph,
        removed,
        marks: vec![Mark::Unvisited; graph.model_count()],
        stack: Vec::new(),
        cycles: Vec::new(),
    };

    for node in graph.graph.node_indices() {
        if search.marks[node.index()] == Mark::Unvisited {
            search.visit(node);
        }
    }

    search.cycles
}
