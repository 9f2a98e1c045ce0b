use anyhow::Result;
use comfy_table::{Cell, Table as ComfyTable};

use mockweave_core::generate::pipeline::prepare_models;
use mockweave_core::graph::dag::DependencyGraph;
use mockweave_core::graph::resolve::{CircularDependencyResolver, DependencyResolution};
use mockweave_core::graph::visualize::{self, GraphFormat as VizFormat};

use crate::args::GraphArgs;
use crate::commands::load_inputs;

pub fn run(args: &GraphArgs) -> Result<()> {
    let (models, config) = load_inputs(&args.models, &args.config_dir)?;

    let detector = config.as_ref().map(|c| c.detect.clone()).unwrap_or_default();
    let mut resolver = CircularDependencyResolver::new();
    if let Some(cfg) = &config {
        resolver = CircularDependencyResolver::with_strategy(cfg.strategy()?);
    }
    if let Some(name) = &args.strategy {
        resolver.set_preferred_strategy(name)?;
    }

    let (models, relations) = prepare_models(&models, &detector);
    let dep_graph = DependencyGraph::from_models(&models, &relations);
    let resolution = resolver.resolve_with_relations(&models, &relations);

    let format = match args.format {
        crate::args::GraphFormat::Mermaid => VizFormat::Mermaid,
        crate::args::GraphFormat::Dot => VizFormat::Dot,
    };

    let output = visualize::visualize(&dep_graph, resolution.resolution_plan.as_ref(), format);
    println!("{}", output);

    if resolution.has_cycles() {
        eprintln!("{}", cycle_table(&resolution));
    }
    eprintln!("Generation order: {}", resolution.generation_order.join(" -> "));

    Ok(())
}

fn cycle_table(resolution: &DependencyResolution) -> ComfyTable {
    let mut t = ComfyTable::new();
    t.set_header(vec!["Cycle", "Type", "Strength", "Break Point"]);
    let plan = resolution.resolution_plan.as_ref();
    for cycle in &resolution.cycles {
        let break_point = plan
            .and_then(|p| {
                p.break_points.iter().find(|bp| {
                    cycle
                        .links()
                        .iter()
                        .any(|&(from, to)| bp.from == from && bp.to == to)
                })
            })
            .map(|bp| format!("{}.{} -> {}", bp.from, bp.fields.join(","), bp.to))
            .unwrap_or_default();
        t.add_row(vec![
            Cell::new(cycle.nodes.join(" -> ")),
            Cell::new(cycle.cycle_type.to_string()),
            Cell::new(cycle.strength.to_string()),
            Cell::new(break_point),
        ]);
    }
    t
}
