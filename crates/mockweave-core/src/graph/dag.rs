use petgraph::graph::{DiGraph, EdgeIndex, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

use crate::detect::Relation;
use crate::schema::types::{Field, Model, ModelMap};

/// A directed graph of model dependencies via relation fields.
/// Edges point from the dependent model to the model it references.
/// Parallel relation fields between the same pair share one edge.
pub struct DependencyGraph {
    pub graph: DiGraph<String, LinkInfo>,
    pub node_indices: HashMap<String, NodeIndex>,
}

/// All relation fields of one model that point at one other model.
#[derive(Debug, Clone)]
pub struct LinkInfo {
    pub fields: Vec<RelationEdge>,
}

/// A single relation field contributing to a link.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationEdge {
    pub field: String,
    /// Optional relation field, or every carrier FK field optional.
    pub optional: bool,
    /// Detector confidence; explicit relations count as 1.0.
    pub confidence: f64,
    /// The id lives on the record itself rather than in local FK fields.
    pub embedded: bool,
}

impl LinkInfo {
    /// A link can be left empty only if every field on it is optional.
    pub fn is_optional(&self) -> bool {
        self.fields.iter().all(|f| f.optional)
    }

    pub fn confidence(&self) -> f64 {
        self.fields
            .iter()
            .map(|f| f.confidence)
            .fold(1.0_f64, f64::min)
    }

    pub fn is_embedded(&self) -> bool {
        self.fields.iter().all(|f| f.embedded)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.field.clone()).collect()
    }
}

fn is_optional_relation(model: &Model, field: &Field) -> bool {
    if field.is_optional {
        return true;
    }
    match &field.relation_from_fields {
        Some(carriers) if !carriers.is_empty() => carriers
            .iter()
            .all(|name| model.field(name).is_some_and(|f| f.is_optional)),
        _ => false,
    }
}

impl DependencyGraph {
    /// Build a dependency graph from a model map.
    /// Each model becomes a node (in map order), each relation field contributes
    /// to the edge from its model to the referenced model. `relations` only
    /// supplies confidence scores for detector-found fields.
    pub fn from_models(models: &ModelMap, relations: &[Relation]) -> Self {
        let mut graph: DiGraph<String, LinkInfo> = DiGraph::new();
        let mut node_indices = HashMap::new();

        for name in models.names() {
            let idx = graph.add_node(name.to_string());
            node_indices.insert(name.to_string(), idx);
        }

        let confidence_of = |model: &str, field: &str| {
            relations
                .iter()
                .find(|r| r.from == model && r.field == field)
                .map(|r| r.confidence)
                .unwrap_or(1.0)
        };

        for model in models.iter() {
            for field in model.relation_fields() {
                let Some(target) = field.target_model() else {
                    continue;
                };
                let (Some(&from_idx), Some(&to_idx)) =
                    (node_indices.get(&model.name), node_indices.get(target))
                else {
                    continue;
                };

                let edge = RelationEdge {
                    field: field.name.clone(),
                    optional: is_optional_relation(model, field),
                    confidence: confidence_of(&model.name, &field.name),
                    embedded: !field.carries_foreign_key(),
                };

                match graph.find_edge(from_idx, to_idx) {
                    Some(existing) => graph[existing].fields.push(edge),
                    None => {
                        graph.add_edge(from_idx, to_idx, LinkInfo { fields: vec![edge] });
                    }
                }
            }
        }

        Self {
            graph,
            node_indices,
        }
    }

    /// Get the model name for a node index.
    pub fn model_name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// Get node index for a model name.
    pub fn node_index(&self, model_name: &str) -> Option<NodeIndex> {
        self.node_indices.get(model_name).copied()
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.graph.node_weights().map(|s| s.as_str()).collect()
    }

    pub fn model_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Outgoing edges of `node` in insertion order, skipping `removed`.
    ///
    /// petgraph yields adjacency in reverse insertion order; sorting by edge
    /// index keeps cycle detection and ordering stable across runs.
    pub fn outgoing(
        &self,
        node: NodeIndex,
        removed: &HashSet<EdgeIndex>,
    ) -> Vec<EdgeReference<'_, LinkInfo>> {
        let mut edges: Vec<_> = self
            .graph
            .edges(node)
            .filter(|e| !removed.contains(&e.id()))
            .collect();
        edges.sort_by_key(|e| e.id());
        edges
    }

    /// The link from one model to another, if any.
    pub fn link(&self, from: &str, to: &str) -> Option<(EdgeIndex, &LinkInfo)> {
        let edge = self
            .graph
            .find_edge(self.node_index(from)?, self.node_index(to)?)?;
        Some((edge, &self.graph[edge]))
    }

    /// A copy of the graph without the given edges.
    pub fn residual(&self, removed: &HashSet<EdgeIndex>) -> DiGraph<String, LinkInfo> {
        self.graph.filter_map(
            |_, name| Some(name.clone()),
            |idx, info| (!removed.contains(&idx)).then(|| info.clone()),
        )
    }
}
