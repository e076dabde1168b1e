//! Tolerant JSON field extraction used by every response parser
//!
//! The Open API has renamed fields across server releases (`tenant` vs
//! `namespaceId`, `id` vs `revision`, ...), so every extractor takes the
//! primary field name plus an ordered list of historical aliases: the first
//! non-null match wins, and a JSON `null` is treated exactly like an absent
//! field. A value of the wrong shape is a decode error, never a silently
//! defaulted field.

use serde_json::Value;

use crate::error::{ClientError, Result};

/// Fixed timestamp format used by config history payloads,
/// e.g. `2010-05-05T00:00:00.000+08:00`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

fn field<'a>(obj: &'a Value, name: &str, aliases: &[&str]) -> Option<&'a Value> {
    let get = |n: &str| match obj.get(n) {
        Some(Value::Null) | None => None,
        Some(v) => Some(v),
    };
    get(name).or_else(|| aliases.iter().find_map(|a| get(a)))
}

/// Extract a string field. Numbers and booleans are coerced to their string
/// form; objects and arrays are a decode error.
pub fn get_str(obj: &Value, name: &str, aliases: &[&str]) -> Result<Option<String>> {
    match field(obj, name, aliases) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(ClientError::decode(format!(
            "field '{name}' is not a string: {other}"
        ))),
    }
}

/// Extract an integer field. Numeric strings are parsed; anything else
/// non-numeric is a decode error.
pub fn get_i64(obj: &Value, name: &str, aliases: &[&str]) -> Result<Option<i64>> {
    match field(obj, name, aliases) {
        None => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| {
            ClientError::decode(format!("field '{name}' is not an integer: {n}"))
        }),
        Some(Value::String(s)) => s.parse::<i64>().map(Some).map_err(|_| {
            ClientError::decode(format!("field '{name}' is not an integer: '{s}'"))
        }),
        Some(other) => Err(ClientError::decode(format!(
            "field '{name}' is not an integer: {other}"
        ))),
    }
}

/// Extract an unsigned integer field.
pub fn get_u64(obj: &Value, name: &str, aliases: &[&str]) -> Result<Option<u64>> {
    match get_i64(obj, name, aliases)? {
        None => Ok(None),
        Some(v) if v >= 0 => Ok(Some(v as u64)),
        Some(v) => Err(ClientError::decode(format!(
            "field '{name}' is negative: {v}"
        ))),
    }
}

/// Extract a floating point field.
pub fn get_f64(obj: &Value, name: &str, aliases: &[&str]) -> Result<Option<f64>> {
    match field(obj, name, aliases) {
        None => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(|| {
            ClientError::decode(format!("field '{name}' is not a number: {n}"))
        }),
        Some(Value::String(s)) => s.parse::<f64>().map(Some).map_err(|_| {
            ClientError::decode(format!("field '{name}' is not a number: '{s}'"))
        }),
        Some(other) => Err(ClientError::decode(format!(
            "field '{name}' is not a number: {other}"
        ))),
    }
}

/// Extract a boolean field. The strings "true"/"false" are accepted.
pub fn get_bool(obj: &Value, name: &str, aliases: &[&str]) -> Result<Option<bool>> {
    match field(obj, name, aliases) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(ClientError::decode(format!(
                "field '{name}' is not a boolean: '{s}'"
            ))),
        },
        Some(other) => Err(ClientError::decode(format!(
            "field '{name}' is not a boolean: {other}"
        ))),
    }
}

/// Parse a timestamp in the fixed history format, returning epoch millis.
/// A malformed timestamp is a decode error, not a zeroed field.
pub fn parse_timestamp(s: &str) -> Result<i64> {
    chrono::DateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| ClientError::decode(format!("invalid timestamp '{s}': {e}")))
}

/// Parse a raw response body as a JSON value.
pub fn json_value(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| ClientError::decode(format!("invalid JSON: {e}")))
}

/// Parse a raw response body straight into a serde type.
pub fn from_json_bytes<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ClientError::decode(format!("invalid JSON: {e}")))
}

/// Unwrap the `{code, message, data}` envelope the v2 (and console) Open API
/// wraps every response in. `code` 0 and 200 both mean success.
pub fn unwrap_envelope(value: Value) -> Result<Value> {
    let code = get_i64(&value, "code", &[])?
        .ok_or_else(|| ClientError::decode("response envelope has no 'code' field"))?;
    if code != 0 && code != 200 {
        let message = get_str(&value, "message", &["msg"])?.unwrap_or_default();
        return Err(ClientError::decode(format!(
            "server error in response envelope: code={code}, message={message}"
        )));
    }
    Ok(value
        .as_object()
        .and_then(|o| o.get("data").cloned())
        .unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_name_wins() {
        let obj = json!({"namespaceId": "dev", "tenant": "ignored"});
        assert_eq!(
            get_str(&obj, "namespaceId", &["tenant"]).unwrap(),
            Some("dev".to_string())
        );
    }

    #[test]
    fn test_alias_fallback() {
        let obj = json!({"tenant": "dev"});
        assert_eq!(
            get_str(&obj, "namespaceId", &["tenant"]).unwrap(),
            Some("dev".to_string())
        );
    }

    #[test]
    fn test_null_is_absent() {
        let obj = json!({"namespaceId": null, "tenant": "dev"});
        // A null primary falls through to the alias instead of failing.
        assert_eq!(
            get_str(&obj, "namespaceId", &["tenant"]).unwrap(),
            Some("dev".to_string())
        );
        assert_eq!(get_str(&obj, "namespaceId", &[]).unwrap(), None);
    }

    #[test]
    fn test_missing_field_is_none() {
        let obj = json!({});
        assert_eq!(get_str(&obj, "group", &["groupName"]).unwrap(), None);
        assert_eq!(get_i64(&obj, "id", &[]).unwrap(), None);
        assert_eq!(get_bool(&obj, "healthy", &[]).unwrap(), None);
    }

    #[test]
    fn test_numeric_string_coercion() {
        let obj = json!({"id": "42", "weight": "1.5", "port": 8848});
        assert_eq!(get_i64(&obj, "id", &[]).unwrap(), Some(42));
        assert_eq!(get_f64(&obj, "weight", &[]).unwrap(), Some(1.5));
        assert_eq!(get_str(&obj, "port", &[]).unwrap(), Some("8848".to_string()));
    }

    #[test]
    fn test_malformed_number_is_decode_error() {
        let obj = json!({"id": "not-a-number"});
        assert!(matches!(
            get_i64(&obj, "id", &[]),
            Err(ClientError::Decode { .. })
        ));
    }

    #[test]
    fn test_object_where_scalar_expected_is_decode_error() {
        let obj = json!({"content": {"nested": true}});
        assert!(get_str(&obj, "content", &[]).is_err());
        assert!(get_bool(&obj, "content", &[]).is_err());
    }

    #[test]
    fn test_negative_where_unsigned_expected() {
        let obj = json!({"count": -1});
        assert!(get_u64(&obj, "count", &[]).is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        let millis = parse_timestamp("2010-05-05T00:00:00.000+08:00").unwrap();
        assert_eq!(millis, 1273017600000);
    }

    #[test]
    fn test_parse_timestamp_failure_is_decode_error() {
        assert!(matches!(
            parse_timestamp("2010/05/05 00:00:00"),
            Err(ClientError::Decode { .. })
        ));
    }

    #[test]
    fn test_unwrap_envelope_success() {
        let data = unwrap_envelope(json!({"code": 0, "message": "ok", "data": "a=1"})).unwrap();
        assert_eq!(data, json!("a=1"));

        // Console endpoints use code 200 for success.
        let data = unwrap_envelope(json!({"code": 200, "message": "", "data": [1, 2]})).unwrap();
        assert_eq!(data, json!([1, 2]));
    }

    #[test]
    fn test_unwrap_envelope_error_code() {
        let err = unwrap_envelope(json!({"code": 500, "message": "boom"})).unwrap_err();
        assert!(err.to_string().contains("code=500"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_unwrap_envelope_missing_code() {
        assert!(unwrap_envelope(json!({"data": 1})).is_err());
    }
}
