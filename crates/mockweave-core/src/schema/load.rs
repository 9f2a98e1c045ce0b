use std::path::Path;

use serde::Deserialize;

use crate::error::{MockWeaveError, Result};
use crate::schema::types::{Model, ModelMap};

/// Accepted JSON layouts for an exported model map.
#[derive(Deserialize)]
#[serde(untagged)]
enum ModelMapDocument {
    /// `{"models": [ {...}, {...} ]}`
    List { models: Vec<Model> },
    /// `{"User": {...}, "Post": {...}}`
    Keyed(indexmap::IndexMap<String, Model>),
}

/// Parse a model map from JSON text.
pub fn parse_models(json: &str, origin: &str) -> Result<ModelMap> {
    let document: ModelMapDocument =
        serde_json::from_str(json).map_err(|e| MockWeaveError::Schema {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

    let mut models = ModelMap::new();
    match document {
        ModelMapDocument::List { models: list } => {
            for model in list {
                models.insert(model);
            }
        }
        ModelMapDocument::Keyed(map) => {
            for (key, mut model) in map {
                if model.name.is_empty() {
                    model.name = key;
                }
                models.insert(model);
            }
        }
    }

    tracing::debug!(
        "Loaded {} models ({} fields) from {}",
        models.len(),
        models.field_count(),
        origin
    );
    Ok(models)
}

/// Read a model map from a JSON file on disk.
pub fn load_models(path: &Path) -> Result<ModelMap> {
    let content = std::fs::read_to_string(path).map_err(|e| MockWeaveError::Schema {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_models(&content, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_list() {
        let json = r#"{"models": [
            {"name": "User", "fields": [{"name": "id", "type": "Int", "isScalar": true, "isId": true}]},
            {"name": "Post", "fields": [{"name": "id", "type": "Int", "isScalar": true, "isId": true}]}
        ]}"#;
        let models = parse_models(json, "inline").unwrap();
        assert_eq!(models.names().collect::<Vec<_>>(), vec!["User", "Post"]);
    }

    #[test]
    fn test_parse_keyed_map_preserves_order() {
        let json = r#"{
            "Zebra": {"name": "Zebra", "fields": []},
            "Apple": {"name": "Apple", "fields": []}
        }"#;
        let models = parse_models(json, "inline").unwrap();
        assert_eq!(models.names().collect::<Vec<_>>(), vec!["Zebra", "Apple"]);
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = parse_models("{not json", "schema.json").unwrap_err();
        assert!(err.to_string().contains("schema.json"));
    }

    #[test]
    fn test_load_models_missing_file() {
        let err = load_models(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, MockWeaveError::Schema { .. }));
    }
}
