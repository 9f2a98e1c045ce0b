use anyhow::Result;
use comfy_table::{Cell, Table as ComfyTable};

use mockweave_core::detect::{topological_order, Relation, RelationDetector};

use crate::args::{DetectArgs, DetectFormat};
use crate::commands::load_inputs;

pub fn run(args: &DetectArgs) -> Result<()> {
    let (models, config) = load_inputs(&args.models, &args.config_dir)?;

    let mut options = config.map(|c| c.detect).unwrap_or_default();
    if let Some(threshold) = args.threshold {
        options.confidence_threshold = threshold;
    }

    let relations = RelationDetector::new(options).detect_relations(&models);

    match args.format {
        DetectFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&relations)?);
        }
        DetectFormat::Table => {
            if models.has_explicit_relations() {
                eprintln!("Note: the model map declares relations; generation will use those instead.");
            }
            println!("{}", relation_table(&relations));
            println!(
                "Relations: {}  Order: {}",
                relations.len(),
                topological_order(&models, &relations).join(" -> ")
            );
        }
    }

    Ok(())
}

fn relation_table(relations: &[Relation]) -> ComfyTable {
    let mut t = ComfyTable::new();
    t.set_header(vec!["From", "Field", "To", "Type", "Foreign Key", "Confidence", "Method"]);
    for relation in relations {
        t.add_row(vec![
            Cell::new(&relation.from),
            Cell::new(&relation.field),
            Cell::new(&relation.to),
            Cell::new(relation.relation_type.to_string()),
            Cell::new(relation.foreign_key.as_deref().unwrap_or("")),
            Cell::new(format!("{:.2}", relation.confidence)),
            Cell::new(relation.detection_method.to_string()),
        ]);
    }
    t
}
