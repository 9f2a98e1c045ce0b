//! # Circular Dependency Resolution
//!
//! Turns the model dependency graph into a generation order. When the graph
//! has cycles, one link per cycle is chosen as a break point: the owning model
//! is generated first without that relation, and the relation is backfilled in
//! a second pass once every referenced id exists.

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::EdgeIndex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::detect::Relation;
use crate::error::{MockWeaveError, Result};
use crate::graph::cycle::{find_cycles, Cycle};
use crate::graph::dag::{DependencyGraph, LinkInfo};
use crate::graph::topo::generation_order;
use crate::schema::types::ModelMap;

/// Names accepted by [`CircularDependencyResolver::set_preferred_strategy`].
pub const AVAILABLE_STRATEGIES: &[&str] = &["smart-break", "lazy-loading", "partial-references"];

/// How break points are filled in after the first generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    /// Backfill every break point.
    #[default]
    SmartBreak,
    /// Backfill only forced breaks; optional ones stay empty.
    LazyLoading,
    /// Backfill forced breaks, and optional ones for about half the records.
    PartialReferences,
}

impl ResolutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStrategy::SmartBreak => "smart-break",
            ResolutionStrategy::LazyLoading => "lazy-loading",
            ResolutionStrategy::PartialReferences => "partial-references",
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionStrategy {
    type Err = MockWeaveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "smart-break" => Ok(ResolutionStrategy::SmartBreak),
            "lazy-loading" => Ok(ResolutionStrategy::LazyLoading),
            "partial-references" => Ok(ResolutionStrategy::PartialReferences),
            other => Err(MockWeaveError::UnknownStrategy {
                name: other.to_string(),
                available: AVAILABLE_STRATEGIES.join(", "),
            }),
        }
    }
}

/// A link removed from the first pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakPoint {
    pub from: String,
    pub to: String,
    /// Relation fields on `from` that make up the link.
    pub fields: Vec<String>,
    /// True when the cycle had no optional link to break.
    pub forced: bool,
}

/// A relation field whose assignment waits for the second pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredRelation {
    pub model: String,
    pub field: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionPlan {
    pub strategy: ResolutionStrategy,
    pub break_points: Vec<BreakPoint>,
    pub deferred_relations: Vec<DeferredRelation>,
}

impl ResolutionPlan {
    /// Fraction of records whose break-point fields get backfilled.
    pub fn backfill_coverage(&self, break_point: &BreakPoint) -> f64 {
        if break_point.forced {
            return 1.0;
        }
        match self.strategy {
            ResolutionStrategy::SmartBreak => 1.0,
            ResolutionStrategy::LazyLoading => 0.0,
            ResolutionStrategy::PartialReferences => 0.5,
        }
    }

    pub fn break_point_for(&self, model: &str, field: &str) -> Option<&BreakPoint> {
        self.break_points
            .iter()
            .find(|bp| bp.from == model && bp.fields.iter().any(|f| f == field))
    }

    /// Whether the field is left out of the first generation pass.
    pub fn is_break_field(&self, model: &str, field: &str) -> bool {
        self.break_point_for(model, field).is_some()
    }

    pub fn is_deferred_field(&self, model: &str, field: &str) -> bool {
        self.deferred_relations
            .iter()
            .any(|d| d.model == model && d.field == field)
    }

    /// Break points of `model` that receive any values in the second pass.
    pub fn backfills_for<'a>(&'a self, model: &'a str) -> impl Iterator<Item = &'a BreakPoint> {
        self.break_points
            .iter()
            .filter(move |bp| bp.from == model && self.backfill_coverage(bp) > 0.0)
    }
}

/// Result of resolving a model map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyResolution {
    pub cycles: Vec<Cycle>,
    /// Models in generation order. A model owning a backfilled break point
    /// appears a second time at the end.
    pub generation_order: Vec<String>,
    /// `None` when the graph has no cycles.
    pub resolution_plan: Option<ResolutionPlan>,
}

impl DependencyResolution {
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

/// Finds cycles between models and plans how to generate around them.
#[derive(Debug, Clone, Default)]
pub struct CircularDependencyResolver {
    strategy: ResolutionStrategy,
}

impl CircularDependencyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: ResolutionStrategy) -> Self {
        Self { strategy }
    }

    pub fn available_strategies(&self) -> &'static [&'static str] {
        AVAILABLE_STRATEGIES
    }

    pub fn preferred_strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    /// Switch strategy by name. Unknown names are rejected and leave the
    /// current strategy in place.
    pub fn set_preferred_strategy(&mut self, name: &str) -> Result<()> {
        self.strategy = name.parse()?;
        Ok(())
    }

    /// Resolve using only the relation fields present on the models.
    pub fn resolve_dependencies(&self, models: &ModelMap) -> DependencyResolution {
        self.resolve_with_relations(models, &[])
    }

    /// Resolve, taking link confidence from detector output where available.
    pub fn resolve_with_relations(
        &self,
        models: &ModelMap,
        relations: &[Relation],
    ) -> DependencyResolution {
        let graph = DependencyGraph::from_models(models, relations);
        let cycles = find_cycles(&graph, &HashSet::new());

        if cycles.is_empty() {
            let generation_order = generation_order(&graph, &HashSet::new());
            tracing::debug!(models = generation_order.len(), "Dependency graph is acyclic");
            return DependencyResolution {
                cycles,
                generation_order,
                resolution_plan: None,
            };
        }

        let tangled = tarjan_scc(&graph.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .count();
        tracing::debug!(
            cycles = cycles.len(),
            tangled_components = tangled,
            strategy = %self.strategy,
            "Resolving circular dependencies"
        );

        let (removed, break_points) = choose_break_points(&graph, &cycles);

        let mut plan = ResolutionPlan {
            strategy: self.strategy,
            break_points,
            deferred_relations: Vec::new(),
        };
        plan.deferred_relations = deferred_relations(&plan);

        let mut order = generation_order(&graph, &removed);
        let mut revisits: Vec<String> = Vec::new();
        for bp in &plan.break_points {
            if plan.backfill_coverage(bp) > 0.0 && !revisits.contains(&bp.from) {
                revisits.push(bp.from.clone());
            }
        }
        order.extend(revisits);

        for bp in &plan.break_points {
            tracing::debug!(
                from = %bp.from,
                to = %bp.to,
                fields = ?bp.fields,
                forced = bp.forced,
                "Break point"
            );
        }

        DependencyResolution {
            cycles,
            generation_order: order,
            resolution_plan: Some(plan),
        }
    }
}

/// Pick one link per cycle until the graph without the picked links is
/// acyclic. Cycles already broken by an earlier pick are skipped.
fn choose_break_points(
    graph: &DependencyGraph,
    cycles: &[Cycle],
) -> (HashSet<EdgeIndex>, Vec<BreakPoint>) {
    let mut removed: HashSet<EdgeIndex> = HashSet::new();
    let mut break_points = Vec::new();
    let mut pending = cycles.to_vec();

    loop {
        for cycle in &pending {
            let links: Vec<Link<'_>> = cycle
                .links()
                .into_iter()
                .filter_map(|(from, to)| {
                    graph
                        .link(from, to)
                        .map(|(edge, info)| (edge, info, from, to))
                })
                .collect();

            if links.is_empty() || links.iter().any(|(edge, ..)| removed.contains(edge)) {
                continue;
            }

            let Some(&(edge, info, from, to)) = pick_link(&links) else {
                continue;
            };
            removed.insert(edge);
            break_points.push(BreakPoint {
                from: from.to_string(),
                to: to.to_string(),
                fields: info.field_names(),
                forced: !info.is_optional(),
            });
        }

        if toposort(&graph.residual(&removed), None).is_ok() {
            break;
        }
        pending = find_cycles(graph, &removed);
        if pending.is_empty() {
            break;
        }
    }

    (removed, break_points)
}

type Link<'g> = (EdgeIndex, &'g LinkInfo, &'g str, &'g str);

/// Optional links first, lowest confidence among them. A cycle with no
/// optional link falls back to the lowest confidence link overall. Equal
/// confidence prefers a link whose id is embedded on the record; remaining
/// ties keep cycle order.
fn pick_link<'a, 'g>(links: &'a [Link<'g>]) -> Option<&'a Link<'g>> {
    let better = |best: &Link<'g>, next: &Link<'g>| match next
        .1
        .confidence()
        .total_cmp(&best.1.confidence())
    {
        Ordering::Less => true,
        Ordering::Equal => next.1.is_embedded() && !best.1.is_embedded(),
        Ordering::Greater => false,
    };
    let lowest = |candidates: Vec<&'a Link<'g>>| {
        candidates
            .into_iter()
            .reduce(|best, next| if better(best, next) { next } else { best })
    };

    let optional: Vec<_> = links.iter().filter(|l| l.1.is_optional()).collect();
    if !optional.is_empty() {
        return lowest(optional);
    }
    lowest(links.iter().collect())
}

fn deferred_relations(plan: &ResolutionPlan) -> Vec<DeferredRelation> {
    plan.break_points
        .iter()
        .filter(|bp| match plan.strategy {
            ResolutionStrategy::SmartBreak => bp.forced,
            _ => plan.backfill_coverage(bp) > 0.0,
        })
        .flat_map(|bp| {
            bp.fields.iter().map(|field| DeferredRelation {
                model: bp.from.clone(),
                field: field.clone(),
                target: bp.to.clone(),
            })
        })
        .collect()
}
