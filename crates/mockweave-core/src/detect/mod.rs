//! # Relation Detector
//!
//! Discovers directed relationships between models when the schema does not
//! state them. Every field of every model is offered to an ordered list of
//! detection strategies; the first strategy that matches claims the field.
//! The list order is the contract:
//!
//! 1. direct reference (declared type is a model name)
//! 2. schema annotation (`@hasMany(Post)`, `@relation(User)`, ...)
//! 3. foreign-key naming (`authorId`, `tag_ids`, `ownerRef`, ...)
//! 4. naming convention (`author`, `posts`, `commentList`, ...)
//! 5. inference (relation keyword plus a fuzzy model-name match)
//!
//! Results below the confidence threshold are dropped and duplicates on
//! `(from, to, field)` are collapsed, keeping the highest confidence.

pub mod strategies;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use crate::schema::types::ModelMap;
use strategies::{default_strategies, DetectionContext, DetectionStrategy};

/// A directed relationship discovered between two models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub from: String,
    pub to: String,
    pub field: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    pub confidence: f64,
    pub detection_method: DetectionMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationType {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationType::OneToOne => write!(f, "one-to-one"),
            RelationType::OneToMany => write!(f, "one-to-many"),
            RelationType::ManyToMany => write!(f, "many-to-many"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    Direct,
    ForeignKey,
    NamingConvention,
    SchemaAnnotation,
    Inferred,
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionMethod::Direct => write!(f, "direct"),
            DetectionMethod::ForeignKey => write!(f, "foreign-key"),
            DetectionMethod::NamingConvention => write!(f, "naming-convention"),
            DetectionMethod::SchemaAnnotation => write!(f, "schema-annotation"),
            DetectionMethod::Inferred => write!(f, "inferred"),
        }
    }
}

/// Detector switches, mirroring the `[detect]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    /// Extra suffix families (`Ref`, `Key`, `Fk`, `List`, `Collection`, ...).
    pub enable_advanced_patterns: bool,
    pub enable_schema_annotations: bool,
    pub enable_inference: bool,
    /// Relations scoring below this are discarded.
    pub confidence_threshold: f64,
}

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            enable_advanced_patterns: true,
            enable_schema_annotations: true,
            enable_inference: true,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Heuristic relation detector driven by an ordered strategy list.
pub struct RelationDetector {
    options: DetectorOptions,
    strategies: Vec<Box<dyn DetectionStrategy>>,
}

impl RelationDetector {
    pub fn new(options: DetectorOptions) -> Self {
        Self {
            options,
            strategies: default_strategies(),
        }
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Detect relations for every field of every model.
    pub fn detect_relations(&self, models: &ModelMap) -> Vec<Relation> {
        let ctx = DetectionContext {
            models,
            options: &self.options,
        };
        let mut found = Vec::new();

        for model in models.iter() {
            for field in &model.fields {
                if field.is_id {
                    continue;
                }
                let claimed = self
                    .strategies
                    .iter()
                    .filter(|s| s.enabled(&self.options))
                    .find_map(|s| s.matches(field, &ctx).map(|m| (s, m)));

                if let Some((strategy, matched)) = claimed {
                    let confidence = strategy.score(&matched);
                    debug!(
                        "{}.{} -> {} via {} ({:.2})",
                        model.name,
                        field.name,
                        matched.target,
                        strategy.method(),
                        confidence
                    );
                    found.push(Relation {
                        from: model.name.clone(),
                        to: matched.target,
                        field: field.name.clone(),
                        relation_type: matched.relation_type,
                        foreign_key: matched.foreign_key,
                        confidence,
                        detection_method: strategy.method(),
                    });
                }
            }
        }

        let threshold = self.options.confidence_threshold;
        dedupe(
            found
                .into_iter()
                .filter(|r| r.confidence >= threshold)
                .collect(),
        )
    }
}

impl Default for RelationDetector {
    fn default() -> Self {
        Self::new(DetectorOptions::default())
    }
}

/// Collapse duplicates on `(from, to, field)`, keeping the highest confidence
/// and the first-seen instance on ties.
fn dedupe(relations: Vec<Relation>) -> Vec<Relation> {
    let mut best: IndexMap<(String, String, String), Relation> = IndexMap::new();
    for relation in relations {
        let key = (
            relation.from.clone(),
            relation.to.clone(),
            relation.field.clone(),
        );
        match best.get(&key) {
            Some(existing) if existing.confidence >= relation.confidence => {}
            _ => {
                best.insert(key, relation);
            }
        }
    }
    best.into_values().collect()
}

/// Adjacency list `from -> [to, ...]` over the detected relations.
pub fn relation_graph(relations: &[Relation]) -> IndexMap<String, Vec<String>> {
    let mut graph: IndexMap<String, IndexSet<String>> = IndexMap::new();
    for r in relations {
        graph.entry(r.from.clone()).or_default().insert(r.to.clone());
        graph.entry(r.to.clone()).or_default();
    }
    graph
        .into_iter()
        .map(|(from, to)| (from, to.into_iter().collect()))
        .collect()
}

/// Best-effort dependency order (targets before the models pointing at them).
///
/// Cycles are tolerated silently: a node already on the DFS path is skipped,
/// so the order is only meaningful for acyclic graphs. Use
/// `graph::resolve::CircularDependencyResolver` when cycles matter.
pub fn topological_order(models: &ModelMap, relations: &[Relation]) -> Vec<String> {
    let graph = relation_graph(relations);
    let mut order = Vec::with_capacity(models.len());
    let mut visited: HashSet<String> = HashSet::new();
    let mut visiting: HashSet<String> = HashSet::new();

    fn visit(
        node: &str,
        graph: &IndexMap<String, Vec<String>>,
        visited: &mut HashSet<String>,
        visiting: &mut HashSet<String>,
        order: &mut Vec<String>,
    ) {
        if visited.contains(node) || visiting.contains(node) {
            return;
        }
        visiting.insert(node.to_string());
        if let Some(targets) = graph.get(node) {
            for target in targets {
                visit(target, graph, visited, visiting, order);
            }
        }
        visiting.remove(node);
        visited.insert(node.to_string());
        order.push(node.to_string());
    }

    for name in models.names() {
        visit(name, &graph, &mut visited, &mut visiting, &mut order);
    }
    order
}
