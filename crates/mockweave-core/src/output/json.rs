use std::io::Write;

use indexmap::IndexMap;

use crate::error::{MockWeaveError, Result};
use crate::generate::engine::{GeneratedData, JoinRow};
use crate::generate::value::{Record, Value};

/// Key holding join-table rows in the output object.
pub const JOIN_TABLES_KEY: &str = "_joinTables";

/// Write generated data as JSON using streaming serialization.
///
/// Writes directly to the writer model-by-model and record-by-record instead
/// of building the whole JSON tree first. Join tables from every model are
/// gathered under [`JOIN_TABLES_KEY`] when any exist.
pub fn write_json<W: Write>(writer: &mut W, data: &IndexMap<String, GeneratedData>) -> Result<()> {
    let join_tables: Vec<(&String, &Vec<JoinRow>)> = data
        .values()
        .flat_map(|d| d.join_table_records.iter())
        .collect();
    let has_joins = !join_tables.is_empty();
    let total_keys = data.len() + usize::from(has_joins);

    write_str(writer, "{\n")?;

    for (model_idx, (model_name, generated)) in data.iter().enumerate() {
        write_str(writer, &format!("  {}: [\n", json_key(model_name)?))?;
        let records = &generated.records;
        for (record_idx, record) in records.iter().enumerate() {
            write_record(writer, record)?;
            if record_idx + 1 < records.len() {
                write_str(writer, ",")?;
            }
            write_str(writer, "\n")?;
        }
        write_str(writer, "  ]")?;
        if model_idx + 1 < total_keys {
            write_str(writer, ",")?;
        }
        write_str(writer, "\n")?;
    }

    if has_joins {
        write_str(writer, &format!("  {}: {{\n", json_key(JOIN_TABLES_KEY)?))?;
        for (table_idx, (table, rows)) in join_tables.iter().enumerate() {
            write_str(writer, &format!("    {}: [", json_key(table)?))?;
            for (row_idx, row) in rows.iter().enumerate() {
                write_str(
                    writer,
                    &format!(
                        "\n      {{\"A\": {}, \"B\": {}}}",
                        json_value(&row.a)?,
                        json_value(&row.b)?
                    ),
                )?;
                if row_idx + 1 < rows.len() {
                    write_str(writer, ",")?;
                }
            }
            write_str(writer, if rows.is_empty() { "]" } else { "\n    ]" })?;
            if table_idx + 1 < join_tables.len() {
                write_str(writer, ",")?;
            }
            write_str(writer, "\n")?;
        }
        write_str(writer, "  }\n")?;
    }

    write_str(writer, "}\n")?;
    writer.flush().map_err(|e| MockWeaveError::Output {
        message: "flushing JSON".to_string(),
        source: e,
    })
}

fn write_record<W: Write>(writer: &mut W, record: &Record) -> Result<()> {
    write_str(writer, "    {")?;
    for (idx, (field, value)) in record.iter().enumerate() {
        write_str(writer, &format!("\n      {}: {}", json_key(field)?, json_value(value)?))?;
        if idx + 1 < record.len() {
            write_str(writer, ",")?;
        }
    }
    write_str(writer, if record.is_empty() { "}" } else { "\n    }" })
}

/// Helper to write a string slice and map IO errors.
fn write_str<W: Write>(writer: &mut W, s: &str) -> Result<()> {
    writer
        .write_all(s.as_bytes())
        .map_err(|e| MockWeaveError::Output {
            message: "writing JSON".to_string(),
            source: e,
        })
}

/// Serialize a string as an RFC 8259-compliant JSON key.
fn json_key(s: &str) -> Result<String> {
    serde_json::to_string(s).map_err(|e| MockWeaveError::Other(format!("JSON key error: {}", e)))
}

fn json_value(value: &Value) -> Result<String> {
    serde_json::to_string(&value.to_json())
        .map_err(|e| MockWeaveError::Other(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(model: &str, records: Vec<Record>) -> IndexMap<String, GeneratedData> {
        let mut data = IndexMap::new();
        data.insert(
            model.to_string(),
            GeneratedData {
                records,
                join_table_records: IndexMap::new(),
            },
        );
        data
    }

    fn parse(data: &IndexMap<String, GeneratedData>) -> serde_json::Value {
        let mut output = Vec::new();
        write_json(&mut output, data).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_write_json() {
        let mut record = Record::new();
        record.insert("name".to_string(), Value::from("Alice"));
        record.insert("active".to_string(), Value::Bool(true));
        let parsed = parse(&single("User", vec![record]));

        assert_eq!(parsed["User"][0]["name"], "Alice");
        assert_eq!(parsed["User"][0]["active"], true);
        assert!(parsed.get(JOIN_TABLES_KEY).is_none());
    }

    #[test]
    fn test_timestamp_iso8601_with_z() {
        let ts = chrono::NaiveDateTime::new(
            chrono::NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            chrono::NaiveTime::from_hms_milli_opt(12, 30, 45, 123).unwrap(),
        );
        let mut record = Record::new();
        record.insert("createdAt".to_string(), Value::Timestamp(ts));
        let parsed = parse(&single("Event", vec![record]));
        assert_eq!(parsed["Event"][0]["createdAt"], "2025-06-15T12:30:45.123Z");
    }

    #[test]
    fn test_join_tables_and_empty_models() {
        let mut data = single("Tag", Vec::new());
        let mut joins = IndexMap::new();
        joins.insert(
            "_PostToTags".to_string(),
            vec![
                JoinRow { a: Value::Int(1), b: Value::Int(3) },
                JoinRow { a: Value::Int(2), b: Value::Int(3) },
            ],
        );
        joins.insert("_PostToLikes".to_string(), Vec::new());
        data.insert(
            "Post".to_string(),
            GeneratedData {
                records: vec![Record::new()],
                join_table_records: joins,
            },
        );

        let parsed = parse(&data);
        assert_eq!(parsed["Tag"].as_array().unwrap().len(), 0);
        assert_eq!(parsed["Post"][0], serde_json::json!({}));
        let tags = parsed[JOIN_TABLES_KEY]["_PostToTags"].as_array().unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1]["A"], 2);
        assert!(parsed[JOIN_TABLES_KEY]["_PostToLikes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_streaming_produces_valid_json() {
        let records = (0..500)
            .map(|i| {
                let mut record = Record::new();
                record.insert("id".to_string(), Value::Int(i));
                record.insert("name".to_string(), Value::owned(format!("user_{}", i)));
                record
            })
            .collect();
        let parsed = parse(&single("User", records));
        assert_eq!(parsed["User"].as_array().unwrap().len(), 500);
    }

    #[test]
    fn test_deterministic_field_order() {
        let mut record = Record::new();
        for (i, name) in ["alpha", "beta", "gamma", "delta"].iter().enumerate() {
            record.insert(name.to_string(), Value::Int(i as i64));
        }
        let data = single("Test", vec![record]);

        let mut first = Vec::new();
        write_json(&mut first, &data).unwrap();
        let json = String::from_utf8(first).unwrap();

        let alpha = json.find("\"alpha\"").unwrap();
        let beta = json.find("\"beta\"").unwrap();
        let delta = json.find("\"delta\"").unwrap();
        assert!(alpha < beta && beta < delta);
    }
}
