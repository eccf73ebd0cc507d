//! Forgiving field decoders for records coming from the bibliographic API.
//!
//! Numeric fields accept integers, floats and numeric strings. Anything else (null, negative,
//! non-finite, objects) falls back to the field default instead of failing the document.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn number(raw: &Value) -> Option<f64> {
    let n = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n >= 0.0).then_some(n)
}

pub(super) fn default_depth() -> u32 {
    1
}

pub(super) fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string identifier, found {other}"
        ))),
    }
}

pub(super) fn cited_by_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(number(&raw).map(|n| n.floor() as u64).unwrap_or(0))
}

pub(super) fn depth<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(number(&raw)
        .map(|n| n.floor() as u32)
        .unwrap_or_else(default_depth))
}

pub(super) fn size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(number(&raw).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use crate::graph::{Graph, LinkKind, Side};

    #[test]
    fn invalid_numeric_fields_fall_back_to_defaults() {
        let g = Graph::from_json_str(
            r#"{
                "nodes": [
                    {"id": "a", "cited_by_count": "12", "depth": 2.7, "size": "3.5"},
                    {"id": "b", "cited_by_count": -4, "depth": null, "size": "huge"},
                    {"id": 7, "citedByCount": {"n": 1}, "depth": "x", "size": -1}
                ]
            }"#,
        )
        .expect("graph");

        let a = &g.nodes[0];
        assert_eq!((a.cited_by_count, a.depth, a.size), (12, 2, 3.5));
        let b = &g.nodes[1];
        assert_eq!((b.cited_by_count, b.depth, b.size), (0, 1, 0.0));
        let c = &g.nodes[2];
        assert_eq!(c.id, "7");
        assert_eq!((c.cited_by_count, c.depth, c.size), (0, 1, 0.0));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let g = Graph::from_json_str(r#"{"nodes": [{"id": "a"}]}"#).expect("graph");
        let a = &g.nodes[0];
        assert_eq!(a.cited_by_count, 0);
        assert_eq!(a.depth, 1);
        assert_eq!(a.size, 0.0);
        assert_eq!(a.side, Side::Other);
    }

    #[test]
    fn side_and_link_type_are_case_insensitive_with_catch_all() {
        let g = Graph::from_json_str(
            r#"{
                "centerId": "a",
                "nodes": [{"id": "a", "side": "CENTER"}, {"id": "b", "side": "sideways"}],
                "links": [
                    {"source": "a", "target": "b", "type": "References"},
                    {"source": "a", "target": "b", "type": "cited_by"},
                    {"source": "a", "target": "b", "type": "related"},
                    {"source": "a", "target": "b"}
                ]
            }"#,
        )
        .expect("graph");

        assert_eq!(g.center_id.as_deref(), Some("a"));
        assert_eq!(g.nodes[0].side, Side::Center);
        assert_eq!(g.nodes[1].side, Side::Other);
        let kinds: Vec<LinkKind> = g.links.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LinkKind::References,
                LinkKind::CitedBy,
                LinkKind::Unknown,
                LinkKind::Unknown
            ]
        );
    }

    #[test]
    fn node_without_id_is_rejected() {
        assert!(Graph::from_json_str(r#"{"nodes": [{"side": "forward"}]}"#).is_err());
        assert!(Graph::from_json_str(r#"{"nodes": [{"id": null}]}"#).is_err());
    }
}
