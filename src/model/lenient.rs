//! Shape-tolerant field decoders.
//!
//! Persisted and imported documents come from browsers, older versions and
//! hand edits. A field with the wrong JSON shape decodes to its default
//! instead of failing the whole document.

use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

use super::project::Project;
use super::task::Task;

/// Fresh opaque identifier for projects and tasks.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Any string; other shapes become `""`.
pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// A non-empty string or number id; anything else gets a fresh id.
pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) if !s.is_empty() => s,
        Value::Number(n) => n.to_string(),
        _ => new_id(),
    })
}

/// Progress percentage, coerced from numbers or numeric strings.
pub fn progress<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    Ok(coerce_progress(&Value::deserialize(d)?))
}

pub fn coerce_progress(v: &Value) -> u8 {
    let n = match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    clamp_progress(n)
}

/// Round to the nearest whole percent and clamp into `0..=100`.
pub fn clamp_progress(n: f64) -> u8 {
    if n.is_nan() {
        return 0;
    }
    n.round().clamp(0.0, 100.0) as u8
}

/// A non-negative integer, else `None`.
pub fn index<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        _ => None,
    })
}

/// Millisecond timestamp; fractional values are truncated.
pub fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    })
}

/// Task list: non-arrays become empty, non-object entries are dropped.
pub fn tasks<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Task>, D::Error> {
    Ok(objects(Value::deserialize(d)?))
}

/// Project list, same rules as [`tasks`].
pub fn projects<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Project>, D::Error> {
    Ok(objects(Value::deserialize(d)?))
}

/// Decode every object entry of an array value, skipping the rest.
pub fn objects<T: serde::de::DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// `activeIndex` on the wire: `-1` for no selection.
pub mod active_index {
    use super::*;

    pub fn serialize<S: Serializer>(active: &Option<usize>, s: S) -> Result<S::Ok, S::Error> {
        match active {
            Some(i) => s.serialize_u64(*i as u64),
            None => s.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
        index(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn progress_coercion() {
        assert_eq!(coerce_progress(&json!(42)), 42);
        assert_eq!(coerce_progress(&json!("75")), 75);
        assert_eq!(coerce_progress(&json!(150)), 100);
        assert_eq!(coerce_progress(&json!(-5)), 0);
        assert_eq!(coerce_progress(&json!(33.5)), 34);
        assert_eq!(coerce_progress(&json!(null)), 0);
        assert_eq!(coerce_progress(&json!("lots")), 0);
        assert_eq!(coerce_progress(&json!([1])), 0);
    }

    #[test]
    fn objects_skips_non_objects() {
        let tasks: Vec<Task> = objects(json!([{"title": "a"}, 3, "x", {"title": "b"}]));
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
        let none: Vec<Task> = objects(json!({"title": "a"}));
        assert!(none.is_empty());
    }
}
