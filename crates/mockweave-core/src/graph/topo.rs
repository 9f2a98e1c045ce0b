use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use crate::graph::dag::DependencyGraph;

/// Order models so that every kept edge points backward: a model comes after
/// every model it depends on.
///
/// Kahn's algorithm over the graph without `removed`. Among ready models the
/// one declared first in the model map goes first, so the order is stable.
/// Self-loops never block their own model. If the remaining graph still has a
/// cycle, the stuck models are appended in declaration order.
pub fn generation_order(graph: &DependencyGraph, removed: &HashSet<EdgeIndex>) -> Vec<String> {
    let count = graph.model_count();
    let kept = |edge: EdgeIndex| !removed.contains(&edge);

    // Number of distinct dependencies still to be placed, per model.
    let mut pending = vec![0usize; count];
    for edge in graph.graph.edge_references() {
        if kept(edge.id()) && edge.source() != edge.target() {
            pending[edge.source().index()] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..count)
        .filter(|&i| pending[i] == 0)
        .map(Reverse)
        .collect();
    let mut placed = vec![false; count];
    let mut order = Vec::with_capacity(count);

    while let Some(Reverse(i)) = ready.pop() {
        let node = NodeIndex::new(i);
        placed[i] = true;
        order.push(graph.model_name(node).to_string());

        // Models that depend on this one lose one pending dependency.
        for edge in graph.graph.edges_directed(node, Direction::Incoming) {
            let dependent = edge.source();
            if !kept(edge.id()) || dependent == node {
                continue;
            }
            let slot = &mut pending[dependent.index()];
            *slot -= 1;
            if *slot == 0 {
                ready.push(Reverse(dependent.index()));
            }
        }
    }

    if order.len() < count {
        tracing::warn!(
            stuck = count - order.len(),
            "Dependency graph still cyclic; appending remaining models in declaration order"
        );
        for i in 0..count {
            if !placed[i] {
                order.push(graph.model_name(NodeIndex::new(i)).to_string());
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{Field, Model, ModelMap};

    fn graph_of(models: Vec<Model>) -> DependencyGraph {
        let mut map = ModelMap::new();
        for m in models {
            map.insert(m);
        }
        DependencyGraph::from_models(&map, &[])
    }

    fn pos(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn test_dependencies_come_first() {
        // Declared child-first on purpose.
        let graph = graph_of(vec![
            Model::new("Comment")
                .with_field(Field::relation("post", "Post"))
                .with_field(Field::relation("author", "User")),
            Model::new("Post").with_field(Field::relation("author", "User")),
            Model::new("User").with_field(Field::scalar("id", "Int").id()),
        ]);

        let order = generation_order(&graph, &HashSet::new());
        assert_eq!(order, vec!["User", "Post", "Comment"]);
    }

    #[test]
    fn test_independent_models_keep_declaration_order() {
        let graph = graph_of(vec![
            Model::new("Tag"),
            Model::new("Setting"),
            Model::new("Audit"),
        ]);
        let order = generation_order(&graph, &HashSet::new());
        assert_eq!(order, vec!["Tag", "Setting", "Audit"]);
    }

    #[test]
    fn test_removed_edge_unblocks_cycle() {
        let graph = graph_of(vec![
            Model::new("A").with_field(Field::relation("b", "B")),
            Model::new("B").with_field(Field::relation("a", "A")),
        ]);
        let (edge, _) = graph.link("A", "B").unwrap();
        let removed: HashSet<_> = [edge].into_iter().collect();

        let order = generation_order(&graph, &removed);
        assert!(pos(&order, "A") < pos(&order, "B"));
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn test_self_loop_does_not_block() {
        let graph = graph_of(vec![
            Model::new("Category").with_field(Field::relation("parent", "Category").optional())
        ]);
        let order = generation_order(&graph, &HashSet::new());
        assert_eq!(order, vec!["Category"]);
    }

    #[test]
    fn test_unbroken_cycle_still_lists_every_model() {
        let graph = graph_of(vec![
            Model::new("A").with_field(Field::relation("b", "B")),
            Model::new("B").with_field(Field::relation("a", "A")),
            Model::new("C"),
        ]);
        let order = generation_order(&graph, &HashSet::new());
        assert_eq!(order, vec!["C", "A", "B"]);
    }
}
