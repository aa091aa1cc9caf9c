//! CSV output.
//!
//! Scalar envelope entries (`timestamp`, headers, `count`, flattened members)
//! become leading columns repeated on every row. Items of `collection`, or the
//! members of `object`, supply one row each with their own columns. A record
//! column named like a leading column is headed `collection.<name>` or
//! `object.<name>`.

use indexmap::IndexSet;
use serde_json::{Map, Value};

use crate::serialization::envelope::{COLLECTION_KEY, OBJECT_KEY};
use crate::serialization::{ResponseEnvelope, SerializeError};

type Record = Vec<(String, String)>;

pub fn to_string(envelope: &ResponseEnvelope) -> Result<String, SerializeError> {
    let mut leading: Vec<(&str, String)> = Vec::new();
    let mut records: Vec<Record> = Vec::new();
    let mut container = COLLECTION_KEY;

    for (key, value) in envelope.entries() {
        match (key.as_str(), value) {
            (COLLECTION_KEY, Value::Array(items)) => {
                records = items.iter().map(record_of).collect();
            }
            (OBJECT_KEY, Value::Object(members)) => {
                records = vec![record_of_members(members)];
                container = OBJECT_KEY;
            }
            _ => leading.push((key.as_str(), cell(value))),
        }
    }

    let columns: IndexSet<&str> = records
        .iter()
        .flat_map(|r| r.iter().map(|(name, _)| name.as_str()))
        .collect();

    let mut header: IndexSet<String> = leading.iter().map(|(name, _)| name.to_string()).collect();
    for column in &columns {
        let mut heading = column.to_string();
        if header.contains(&heading) {
            heading = format!("{container}.{column}");
        }
        let base = heading.clone();
        let mut n = 1;
        while header.contains(&heading) {
            n += 1;
            heading = format!("{base}_{n}");
        }
        header.insert(heading);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header).map_err(csv_error)?;

    if records.is_empty() {
        writer
            .write_record(leading.iter().map(|(_, v)| v.as_str()))
            .map_err(csv_error)?;
    }
    for record in &records {
        let row = leading.iter().map(|(_, v)| v.as_str()).chain(columns.iter().map(|column| {
            record
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, v)| v.as_str())
                .unwrap_or("")
        }));
        writer.write_record(row).map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SerializeError::Csv(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

fn record_of(item: &Value) -> Record {
    match item {
        Value::Object(members) => record_of_members(members),
        other => vec![("item".to_string(), cell(other))],
    }
}

fn record_of_members(members: &Map<String, Value>) -> Record {
    members
        .iter()
        .map(|(name, value)| (name.clone(), cell(value)))
        .collect()
}

/// Nested values are written as compact JSON text.
fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn csv_error(e: csv::Error) -> SerializeError {
    SerializeError::Csv(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{Model, SerializationConfig};
    use serde_json::json;

    fn render(value: Value, config: &SerializationConfig) -> String {
        let model = Model::from_value(value);
        to_string(&ResponseEnvelope::build(&model, config)).unwrap()
    }

    fn rows(text: &str) -> Vec<Vec<String>> {
        csv::Reader::from_reader(text.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_collection_rows() {
        let text = render(
            json!([{"id": 1, "name": "desk"}, {"id": 2, "name": "lamp, tall", "tags": ["x"]}]),
            &SerializationConfig::default(),
        );

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(header, ["timestamp", "count", "id", "name", "tags"]);

        let rows = rows(&text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1..], ["2", "1", "desk", ""]);
        assert_eq!(rows[1][1..], ["2", "2", "lamp, tall", r#"["x"]"#]);
    }

    #[test]
    fn test_flat_model_is_single_row() {
        let config = SerializationConfig::new().header("source", "catalog");
        let text = render(json!({"status": "ok"}), &config);

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(header, ["timestamp", "source", "status"]);
        let rows = rows(&text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1..], ["catalog", "ok"]);
    }

    #[test]
    fn test_record_columns_never_repeat_leading_columns() {
        let config = SerializationConfig::new().header("id", 99);
        let text = render(json!([{"id": 1, "count": 4}, {"id": 2, "count": 0}]), &config);

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(header, ["timestamp", "id", "count", "collection.id", "collection.count"]);
        let rows = rows(&text);
        assert_eq!(rows[0][1..], ["99", "2", "1", "4"]);
        assert_eq!(rows[1][1..], ["99", "2", "2", "0"]);

        let config = SerializationConfig::new().header("name", "catalog");
        let text = render(json!({"name": "chair", "color": "red"}), &config);
        let header = text.lines().next().unwrap();
        assert_eq!(header, "timestamp,name,object.name,color");
    }

    #[test]
    fn test_object_model_columns() {
        let text = render(json!({"id": 5, "name": "chair", "_cost": 3}), &SerializationConfig::default());
        let rows = rows(&text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1..], ["5", "chair"]);
        assert!(!text.contains("_cost"));
    }
}
