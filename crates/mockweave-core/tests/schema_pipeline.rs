//! End-to-end: model map on disk, config on disk, pipeline, JSON output.

use std::collections::HashSet;

use mockweave_core::config::read_config;
use mockweave_core::generate::pipeline::run_pipeline;
use mockweave_core::output::json::{write_json, JOIN_TABLES_KEY};
use mockweave_core::schema::load::load_models;

const MODELS: &str = r#"{
  "models": [
    {
      "name": "Author",
      "fields": [
        {"name": "id", "type": "Int", "isScalar": true, "isId": true},
        {"name": "email", "type": "String", "isScalar": true, "isUnique": true},
        {"name": "role", "type": "String", "isScalar": true},
        {"name": "books", "type": "Book", "isRelation": true, "isArray": true}
      ]
    },
    {
      "name": "Book",
      "fields": [
        {"name": "id", "type": "String", "isScalar": true, "isId": true},
        {"name": "title", "type": "String", "isScalar": true},
        {"name": "authorId", "type": "Int", "isScalar": true},
        {"name": "author", "type": "Author", "isRelation": true,
         "relationFromFields": ["authorId"], "relationReferences": ["id"]},
        {"name": "genres", "type": "Genre", "isRelation": true, "isArray": true}
      ]
    },
    {
      "name": "Genre",
      "fields": [
        {"name": "id", "type": "Int", "isScalar": true, "isId": true},
        {"name": "label", "type": "String", "isScalar": true}
      ]
    }
  ]
}"#;

const CONFIG: &str = r#"
[generate]
count = 6
seed = 1234

[models.Genre]
count = 3

[fields."Author.role"]
values = ["admin", "writer"]
"#;

fn run_to_json(dir: &std::path::Path, sql_mode: bool) -> serde_json::Value {
    let models = load_models(&dir.join("models.json")).unwrap();
    let config = read_config(dir).unwrap().unwrap();
    let mut options = config.to_pipeline_options().unwrap();
    options.sql_mode = sql_mode;
    options.base_time = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0));

    let output = run_pipeline(&models, &options, None).unwrap();
    let mut buf = Vec::new();
    write_json(&mut buf, &output.data).unwrap();
    serde_json::from_slice(&buf).unwrap()
}

fn setup() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("models.json"), MODELS).unwrap();
    std::fs::write(dir.path().join("mockweave.toml"), CONFIG).unwrap();
    dir
}

#[test]
fn test_file_inputs_produce_consistent_records() {
    let dir = setup();
    let json = run_to_json(dir.path(), false);

    let authors = json["Author"].as_array().unwrap();
    let books = json["Book"].as_array().unwrap();
    assert_eq!(authors.len(), 6);
    assert_eq!(books.len(), 6);
    assert_eq!(json["Genre"].as_array().unwrap().len(), 3);

    let author_ids: HashSet<i64> = authors.iter().filter_map(|a| a["id"].as_i64()).collect();
    for book in books {
        let author_id = book["authorId"].as_i64().unwrap();
        assert!(author_ids.contains(&author_id));
        assert!(book.get("author").is_none());
    }

    for author in authors {
        let role = author["role"].as_str().unwrap();
        assert!(role == "admin" || role == "writer");
    }

    let emails: HashSet<&str> = authors.iter().filter_map(|a| a["email"].as_str()).collect();
    assert_eq!(emails.len(), authors.len());
}

#[test]
fn test_seeded_runs_are_identical() {
    let dir = setup();
    assert_eq!(run_to_json(dir.path(), false), run_to_json(dir.path(), false));
}

#[test]
fn test_sql_mode_moves_arrays_to_join_tables() {
    let dir = setup();
    let json = run_to_json(dir.path(), true);

    for book in json["Book"].as_array().unwrap() {
        assert!(book.get("genres").is_none());
    }
    let joins = json[JOIN_TABLES_KEY].as_object().unwrap();
    assert!(joins.contains_key("_BookToGenres"));
}
