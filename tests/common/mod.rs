#![allow(dead_code)]

use flatree::model::Record;
use serde_json::{json, Value};

/// Continents, countries and cities, sorted by name so that input order
/// differs from ID order.
pub fn numeric_records() -> Vec<Record> {
    let mut records = vec![
        json!({"id": 1, "name": "Europe", "parent": 0}),
        json!({"id": 3, "name": "America", "parent": 0}),
        json!({"id": 4, "name": "Asia", "parent": 0}),
        json!({"id": 5, "name": "Africa", "parent": 0}),
        json!({"id": 6, "name": "Australia", "parent": 0}),
        json!({"id": 7, "name": "Germany", "parent": 1}),
        json!({"id": 10, "name": "Portugal", "parent": 1}),
        json!({"id": 11, "name": "Hamburg", "parent": 7}),
        json!({"id": 12, "name": "Munich", "parent": 7}),
        json!({"id": 15, "name": "Berlin", "parent": 7}),
        json!({"id": 20, "name": "Lisbon", "parent": 10}),
        json!({"id": 27, "name": "Eimsbüttel", "parent": 11}),
        json!({"id": 21, "name": "Altona", "parent": 11}),
    ]
    .into_iter()
    .map(into_record)
    .collect::<Vec<_>>();

    records.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
    records
}

/// Categories with string IDs below root ID `""`, sorted by ID.
pub fn string_records(id_field: &str, parent_field: &str) -> Vec<Record> {
    let pairs = [
        ("vehicle", ""),
        ("bicycle", "vehicle"),
        ("car", "vehicle"),
        ("building", ""),
        ("school", "building"),
        ("library", "building"),
        ("primary-school", "school"),
    ];

    let mut records: Vec<Record> = pairs
        .iter()
        .map(|(id, parent)| {
            let mut record = Record::new();
            record.insert(id_field.to_string(), json!(id));
            record.insert(parent_field.to_string(), json!(parent));
            record
        })
        .collect();

    records.sort_by(|a, b| a[id_field].as_str().cmp(&b[id_field].as_str()));
    records
}

pub fn into_record(value: Value) -> Record {
    match value {
        Value::Object(record) => record,
        other => panic!("Not a record: {other}"),
    }
}

/// Records from a list of `(id, parent)` pairs.
pub fn pairs_to_records(pairs: &[(Value, Value)]) -> Vec<Record> {
    pairs
        .iter()
        .map(|(id, parent)| into_record(json!({"id": id, "parent": parent})))
        .collect()
}

/// String forms of the IDs of `nodes`.
pub fn ids<'a, I>(nodes: I) -> Vec<String>
where
    I: IntoIterator<Item = flatree::model::NodeRef<'a>>,
{
    nodes.into_iter().map(|node| node.to_string()).collect()
}
