//! Tolerant field decoders for externally produced audit JSON.
//!
//! Audit payloads come from third-party tooling and are frequently partial.
//! These helpers drop the malformed piece (one asset category, one large-file
//! entry, a non-numeric score) instead of rejecting the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::model::Metric;

/// Valid performance scores.
pub const SCORE_RANGE: std::ops::RangeInclusive<i64> = 0..=100;

/// Read a number, accepting numeric strings; anything else becomes `None`.
pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_number))
}

/// Read an integral number. Fractional or non-numeric values become `None`.
pub fn opt_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_integer))
}

/// Read a 0-100 performance score. Values outside that range are dropped
/// along with anything [`opt_integer`] would reject.
pub fn opt_score<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_integer).and_then(|score| {
        if SCORE_RANGE.contains(&score) {
            Some(score)
        } else {
            debug!(score, "skipping out-of-range score");
            None
        }
    }))
}

/// Read a `name -> number` map, skipping non-numeric entries.
pub fn numbers<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match as_number(&value) {
            Some(number) => Some((key, number)),
            None => {
                debug!(%key, "skipping non-numeric asset weight");
                None
            }
        })
        .collect())
}

/// Read a metric map keyed by [`Metric::key`], skipping unknown keys and
/// non-numeric values.
pub fn metrics<'de, D>(deserializer: D) -> Result<BTreeMap<Metric, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| {
            let metric = Metric::from_key(&key)?;
            as_number(&value).map(|number| (metric, number))
        })
        .collect())
}

/// Read a list, keeping only the entries that decode as `T`.
pub fn entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(%err, "skipping malformed list entry");
                None
            }
        })
        .collect())
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

#[allow(clippy::cast_possible_truncation)]
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(integer) = value.as_i64() {
        return Some(integer);
    }
    let number = as_number(value)?;
    // Only whole values inside i64 range survive the cast unchanged.
    (number.fract() == 0.0 && number.abs() < 9.0e18).then_some(number as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "opt_number")]
        number: Option<f64>,
        #[serde(default, deserialize_with = "opt_integer")]
        integer: Option<i64>,
        #[serde(default, deserialize_with = "opt_score")]
        score: Option<i64>,
        #[serde(default, deserialize_with = "numbers")]
        map: BTreeMap<String, f64>,
        #[serde(default, deserialize_with = "entries")]
        list: Vec<Entry>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Entry {
        url: String,
    }

    fn fields(value: Value) -> Fields {
        serde_json::from_value(value).expect("fields decode")
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let p = fields(json!({"number": " 12.5 ", "integer": "81"}));
        assert_eq!(p.number, Some(12.5));
        assert_eq!(p.integer, Some(81));
    }

    #[test]
    fn garbage_scalars_become_none() {
        let p = fields(json!({"number": {"x": 1}, "integer": 80.5}));
        assert_eq!(p.number, None);
        assert_eq!(p.integer, None);
    }

    #[test]
    fn whole_floats_count_as_integers() {
        let p = fields(json!({"integer": 80.0}));
        assert_eq!(p.integer, Some(80));
    }

    #[test]
    fn scores_outside_range_are_dropped() {
        assert_eq!(fields(json!({"score": 150})).score, None);
        assert_eq!(fields(json!({"score": -20})).score, None);
        assert_eq!(fields(json!({"score": i64::MAX})).score, None);
        assert_eq!(fields(json!({"score": "100"})).score, Some(100));
        assert_eq!(fields(json!({"score": 0})).score, Some(0));
    }

    #[test]
    fn null_and_missing_fields_are_empty() {
        let p = fields(json!({"number": null, "map": null, "list": null}));
        assert_eq!(p.number, None);
        assert!(p.map.is_empty());
        assert!(p.list.is_empty());
    }

    #[test]
    fn map_skips_non_numeric_entries() {
        let p = fields(json!({"map": {"script": 1200, "image": "n/a", "font": "300"}}));
        assert_eq!(p.map.len(), 2);
        assert_eq!(p.map["script"], 1200.0);
        assert_eq!(p.map["font"], 300.0);
    }

    #[test]
    fn list_skips_malformed_entries() {
        let p = fields(json!({"list": [{"url": "a"}, {"size": 3}, "junk", {"url": "b"}]}));
        assert_eq!(
            p.list,
            vec![
                Entry {
                    url: "a".to_string()
                },
                Entry {
                    url: "b".to_string()
                }
            ]
        );
    }
}
