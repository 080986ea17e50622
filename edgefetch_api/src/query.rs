//! Query-string serialization shared by GET/DELETE paths and the POST/PUT
//! compatibility fallback.

use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::Error;

/// Flattens `params` into ordered key/value pairs.
///
/// `params` must serialize to a JSON object; `null` (including `()`) means no
/// parameters. Keys keep their insertion order. `null` values are skipped,
/// strings are taken verbatim, numbers and booleans use their JSON text, and
/// nested objects or arrays are JSON-encoded.
pub fn params_to_pairs<P>(params: &P) -> Result<Vec<(String, String)>, Error>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(params).map_err(|e| Error::InvalidParams(e.to_string()))?;
    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(Error::InvalidParams(format!(
                "expected a JSON object, got {}",
                kind(&other)
            )))
        }
    };
    Ok(map
        .into_iter()
        .filter_map(|(key, value)| flatten_value(value).map(|v| (key, v)))
        .collect())
}

/// Encodes pairs as `application/x-www-form-urlencoded`.
pub fn encode_query(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Appends `params` to `path` as a query string.
///
/// Uses `&` when `path` already carries a query, `?` otherwise. With no
/// parameters the path is returned unchanged.
pub fn build_path<P>(path: &str, params: &P) -> Result<String, Error>
where
    P: Serialize + ?Sized,
{
    let query = encode_query(&params_to_pairs(params)?);
    if query.is_empty() {
        return Ok(path.to_string());
    }
    let separator = if path.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", path, separator, query))
}

fn flatten_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => Some(nested.to_string()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_are_json_encoded() {
        let path = build_path("/x", &json!({"a": 1, "b": {"c": 2}})).unwrap();
        insta::assert_snapshot!(path, @"/x?a=1&b=%7B%22c%22%3A2%7D");
    }

    #[test]
    fn existing_query_uses_ampersand() {
        let path = build_path("/x?foo=bar", &json!({"a": 1})).unwrap();
        insta::assert_snapshot!(path, @"/x?foo=bar&a=1");
        assert_eq!(path.matches('?').count(), 1);
    }

    #[test]
    fn null_values_are_skipped() {
        let path = build_path("/x", &json!({"a": null, "b": "keep"})).unwrap();
        assert_eq!(path, "/x?b=keep");
        assert!(!path.contains("a="));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let path = build_path("/x", &json!({"zeta": 1, "alpha": 2, "mid": 3})).unwrap();
        assert_eq!(path, "/x?zeta=1&alpha=2&mid=3");
    }

    #[test]
    fn struct_fields_keep_declaration_order() {
        #[derive(Serialize)]
        struct Range {
            start_at: i64,
            end_at: i64,
            #[serde(skip_serializing_if = "Option::is_none")]
            unit: Option<String>,
            timezone: Option<String>,
        }
        let params = Range {
            start_at: 1700000000000,
            end_at: 1700086400000,
            unit: None,
            timezone: None,
        };
        let path = build_path("/api/websites/abc/stats", &params).unwrap();
        assert_eq!(
            path,
            "/api/websites/abc/stats?start_at=1700000000000&end_at=1700086400000"
        );
    }

    #[test]
    fn scalars_use_their_text_form() {
        let pairs = params_to_pairs(&json!({"s": "a b", "t": true, "n": 2.5, "arr": [1, 2]})).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("s".to_string(), "a b".to_string()),
                ("t".to_string(), "true".to_string()),
                ("n".to_string(), "2.5".to_string()),
                ("arr".to_string(), "[1,2]".to_string()),
            ]
        );
        insta::assert_snapshot!(encode_query(&pairs), @"s=a+b&t=true&n=2.5&arr=%5B1%2C2%5D");
    }

    #[test]
    fn empty_params_leave_path_unchanged() {
        assert_eq!(build_path("/x", &json!({})).unwrap(), "/x");
        assert_eq!(build_path("/x", &()).unwrap(), "/x");
        assert_eq!(build_path("/x?foo=bar", &json!({"a": null})).unwrap(), "/x?foo=bar");
    }

    #[test]
    fn non_object_params_are_rejected() {
        let err = params_to_pairs(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));
        assert!(err.to_string().contains("an array"));

        assert!(build_path("/x", &"text").is_err());
    }
}
