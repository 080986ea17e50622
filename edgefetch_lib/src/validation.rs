//! Parsing and validation of user-supplied request inputs.

use edgefetch_api::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

use crate::error::EdgeFetchError;

pub const MAX_PARAM_KEY_LENGTH: usize = 128;

/// Validate a request path: must be non-empty and start with `/`.
pub fn validate_path(input: &str) -> Result<String, EdgeFetchError> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Err(EdgeFetchError::InvalidInput(format!(
            "path '{}' must start with '/'",
            input
        )));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(EdgeFetchError::InvalidInput(format!(
            "path '{}' must not contain whitespace",
            input
        )));
    }
    Ok(trimmed.to_string())
}

/// Parse a `key=value` parameter.
///
/// The value is read as JSON when it parses (`3`, `true`, `{"a":1}`),
/// otherwise it is kept as a plain string. An empty value is an empty string.
pub fn parse_param(input: &str) -> Result<(String, Value), EdgeFetchError> {
    let (key, raw) = input.split_once('=').ok_or_else(|| {
        EdgeFetchError::InvalidInput(format!("parameter '{}' is not in key=value form", input))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(EdgeFetchError::InvalidInput(format!(
            "parameter '{}' has an empty key",
            input
        )));
    }
    if key.len() > MAX_PARAM_KEY_LENGTH {
        return Err(EdgeFetchError::InvalidInput(format!(
            "parameter key exceeds maximum length of {} bytes",
            MAX_PARAM_KEY_LENGTH
        )));
    }
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Parse a `Name: value` header.
pub fn parse_header(input: &str) -> Result<(HeaderName, HeaderValue), EdgeFetchError> {
    let (name, value) = input.split_once(':').ok_or_else(|| {
        EdgeFetchError::InvalidInput(format!("header '{}' is not in 'Name: value' form", input))
    })?;
    let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| {
        EdgeFetchError::InvalidInput(format!("invalid header name in '{}': {}", input, e))
    })?;
    let value = HeaderValue::from_str(value.trim()).map_err(|e| {
        EdgeFetchError::InvalidInput(format!("invalid header value in '{}': {}", input, e))
    })?;
    Ok((name, value))
}

/// Collect `Name: value` headers into a map. Later entries replace earlier ones.
pub fn parse_headers(inputs: &[String]) -> Result<HeaderMap, EdgeFetchError> {
    let mut headers = HeaderMap::new();
    for input in inputs {
        let (name, value) = parse_header(input)?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Build a parameter object from an optional JSON object plus `key=value`
/// overrides, preserving the order keys were given in.
pub fn build_params(json: Option<&str>, params: &[String]) -> Result<Map<String, Value>, EdgeFetchError> {
    let mut map = match json {
        Some(text) => match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => map,
            _ => {
                return Err(EdgeFetchError::InvalidInput(
                    "--json payload must be a JSON object".to_string(),
                ))
            }
        },
        None => Map::new(),
    };
    for input in params {
        let (key, value) = parse_param(input)?;
        map.insert(key, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_valid() {
        assert_eq!(validate_path("/api/websites").unwrap(), "/api/websites");
        assert_eq!(validate_path(" /x?a=1 ").unwrap(), "/x?a=1");
    }

    #[test]
    fn path_invalid() {
        assert!(validate_path("api/websites").is_err());
        assert!(validate_path("").is_err());
        assert!(validate_path("/a b").is_err());
    }

    #[test]
    fn param_json_values() {
        assert_eq!(parse_param("a=1").unwrap(), ("a".to_string(), json!(1)));
        assert_eq!(parse_param("flag=true").unwrap(), ("flag".to_string(), json!(true)));
        assert_eq!(
            parse_param(r#"b={"c":2}"#).unwrap(),
            ("b".to_string(), json!({"c": 2}))
        );
    }

    #[test]
    fn param_string_values() {
        assert_eq!(parse_param("name=My Blog").unwrap(), ("name".to_string(), json!("My Blog")));
        assert_eq!(parse_param("q=").unwrap(), ("q".to_string(), json!("")));
        assert_eq!(parse_param("u=a=b").unwrap(), ("u".to_string(), json!("a=b")));
    }

    #[test]
    fn param_invalid() {
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=1").is_err());
        let long_key = format!("{}=1", "k".repeat(MAX_PARAM_KEY_LENGTH + 1));
        assert!(parse_param(&long_key).is_err());
    }

    #[test]
    fn header_valid() {
        let (name, value) = parse_header("Content-Type: text/plain").unwrap();
        assert_eq!(name.as_str(), "content-type");
        assert_eq!(value, "text/plain");
    }

    #[test]
    fn header_invalid() {
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header("bad name: x").is_err());
    }

    #[test]
    fn headers_later_entries_win() {
        let headers =
            parse_headers(&["Accept: text/html".to_string(), "accept: */*".to_string()]).unwrap();
        assert_eq!(headers.get_all("accept").iter().count(), 1);
        assert_eq!(headers["accept"], "*/*");
    }

    #[test]
    fn params_merge_json_and_overrides() {
        let params = build_params(
            Some(r#"{"z":1,"a":{"b":2}}"#),
            &["z=3".to_string(), "m=x".to_string()],
        )
        .unwrap();
        assert_eq!(Value::Object(params.clone()), json!({"z": 3, "a": {"b": 2}, "m": "x"}));
        let keys: Vec<&String> = params.keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn params_json_must_be_object() {
        assert!(matches!(
            build_params(Some("[1]"), &[]),
            Err(EdgeFetchError::InvalidInput(_))
        ));
        assert!(matches!(
            build_params(Some("{oops"), &[]),
            Err(EdgeFetchError::Serialization(_))
        ));
    }
}
