use crate::graph::dag::DependencyGraph;
use crate::graph::resolve::ResolutionPlan;
use petgraph::visit::EdgeRef;

/// Output format for graph visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Mermaid,
    Dot,
}

/// Render the dependency graph. Links chosen as break points are drawn
/// dashed and tagged "deferred".
pub fn visualize(
    graph: &DependencyGraph,
    plan: Option<&ResolutionPlan>,
    format: GraphFormat,
) -> String {
    let links = collect_links(graph, plan);
    match format {
        GraphFormat::Mermaid => generate_mermaid(graph, &links),
        GraphFormat::Dot => generate_dot(&links),
    }
}

struct DrawnLink<'a> {
    from: &'a str,
    to: &'a str,
    label: String,
    deferred: bool,
}

fn collect_links<'a>(
    graph: &'a DependencyGraph,
    plan: Option<&ResolutionPlan>,
) -> Vec<DrawnLink<'a>> {
    graph
        .graph
        .edge_references()
        .map(|edge| {
            let from = graph.model_name(edge.source());
            let to = graph.model_name(edge.target());
            let deferred = plan.is_some_and(|p| {
                p.break_points
                    .iter()
                    .any(|bp| bp.from == from && bp.to == to)
            });
            DrawnLink {
                from,
                to,
                label: edge.weight().field_names().join(", "),
                deferred,
            }
        })
        .collect()
}

fn generate_mermaid(graph: &DependencyGraph, links: &[DrawnLink<'_>]) -> String {
    let mut output = String::from("graph TD\n");

    for name in graph.model_names() {
        output.push_str(&format!("    {}[{}]\n", name, name));
    }

    output.push('\n');

    for link in links {
        if link.deferred {
            output.push_str(&format!(
                "    {} -.->|{} (deferred)| {}\n",
                link.from, link.label, link.to
            ));
        } else {
            output.push_str(&format!(
                "    {} -->|{}| {}\n",
                link.from, link.label, link.to
            ));
        }
    }

    if links.iter().any(|l| l.deferred) {
        output.push_str("\n    %% Deferred relations shown with dashed lines\n");
    }

    output
}

fn generate_dot(links: &[DrawnLink<'_>]) -> String {
    let mut output = String::from("digraph dependencies {\n");
    output.push_str("    rankdir=TB;\n");
    output.push_str("    node [shape=box, style=rounded];\n\n");

    for link in links {
        if link.deferred {
            output.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{} (deferred)\", style=dashed, color=red];\n",
                link.from, link.to, link.label
            ));
        } else {
            output.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                link.from, link.to, link.label
            ));
        }
    }

    output.push_str("}\n");
    output
}
