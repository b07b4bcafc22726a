//! Response contract assertions
//!
//! Each helper checks one aspect of a response and returns
//! [`Error::Contract`] describing the mismatch.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::fetch::ApiResponse;

/// The response status must equal `expected`
pub fn expect_status(response: &ApiResponse, expected: u16) -> Result<()> {
    if response.status != expected {
        return Err(Error::contract(format!(
            "expected status {}, got {} with body {}",
            expected, response.status, response.body
        )));
    }
    Ok(())
}

/// The response status must be one of `allowed`
pub fn expect_status_in(response: &ApiResponse, allowed: &[u16]) -> Result<()> {
    if !allowed.contains(&response.status) {
        return Err(Error::contract(format!(
            "expected status in {:?}, got {} with body {}",
            allowed, response.status, response.body
        )));
    }
    Ok(())
}

/// The `Content-Type` header must include `application/json`
pub fn expect_json_content_type(response: &ApiResponse) -> Result<()> {
    match response.content_type() {
        Some(ct) if ct.contains("application/json") => Ok(()),
        other => Err(Error::contract(format!(
            "expected application/json content type, got {:?}",
            other
        ))),
    }
}

/// Status plus JSON content type, the check every success path starts with
pub fn expect_json_response(response: &ApiResponse, expected: u16) -> Result<()> {
    expect_status(response, expected)?;
    expect_json_content_type(response)
}

/// Every key in `keys` must be present on the object `value`
pub fn expect_keys(value: &Value, keys: &[&str]) -> Result<()> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::contract(format!("expected a JSON object, got {}", value)))?;

    let missing: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|k| !object.contains_key(*k))
        .collect();

    if !missing.is_empty() {
        return Err(Error::contract(format!(
            "missing keys {:?} in {}",
            missing, value
        )));
    }
    Ok(())
}

/// `value[key]` must be the string `expected`
pub fn expect_str(value: &Value, key: &str, expected: &str) -> Result<()> {
    match value.get(key) {
        Some(Value::String(actual)) if actual == expected => Ok(()),
        Some(actual) => Err(Error::contract(format!(
            "expected {} to be {:?}, got {}",
            key, expected, actual
        ))),
        None => Err(Error::contract(format!("missing key {} in {}", key, value))),
    }
}

/// `value[key]` must be a JSON number
pub fn expect_number(value: &Value, key: &str) -> Result<()> {
    match value.get(key) {
        Some(Value::Number(_)) => Ok(()),
        Some(actual) => Err(Error::contract(format!(
            "expected {} to be a number, got {}",
            key, actual
        ))),
        None => Err(Error::contract(format!("missing key {} in {}", key, value))),
    }
}

/// `value[key]` must be a JSON array
pub fn expect_array(value: &Value, key: &str) -> Result<()> {
    match value.get(key) {
        Some(Value::Array(_)) => Ok(()),
        Some(actual) => Err(Error::contract(format!(
            "expected {} to be an array, got {}",
            key, actual
        ))),
        None => Err(Error::contract(format!("missing key {} in {}", key, value))),
    }
}

/// The response must carry `expected_status` and `{ "error": expected_error }`
pub fn expect_error_message(
    response: &ApiResponse,
    expected_status: u16,
    expected_error: &str,
) -> Result<()> {
    expect_status(response, expected_status)?;
    expect_str(&response.body, "error", expected_error)
}

/// JWTs have exactly three non-empty dot-separated segments
pub fn is_jwt_shaped(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    segments.len() == 3 && segments.iter().all(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
    use serde_json::json;

    fn response(status: u16, body: Value) -> ApiResponse {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        ApiResponse {
            status,
            headers,
            body,
        }
    }

    #[test]
    fn test_status_checks() {
        let res = response(409, json!({"error": "User already exists"}));
        assert!(expect_status(&res, 409).is_ok());
        assert!(expect_status(&res, 201).is_err());
        assert!(expect_status_in(&res, &[400, 409]).is_ok());
        assert!(expect_status_in(&res, &[400, 401]).is_err());
    }

    #[test]
    fn test_content_type_with_charset() {
        let mut res = response(200, json!({}));
        assert!(expect_json_content_type(&res).is_ok());

        res.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        assert!(expect_json_content_type(&res).is_err());

        res.headers.clear();
        assert!(expect_json_content_type(&res).is_err());
    }

    #[test]
    fn test_expect_keys_reports_missing() {
        let body = json!({"status": "OK", "message": "up"});
        assert!(expect_keys(&body, &["status", "message"]).is_ok());

        match expect_keys(&body, &["status", "timestamp"]) {
            Err(Error::Contract(msg)) => assert!(msg.contains("timestamp")),
            other => panic!("Expected contract error, got {:?}", other),
        }

        assert!(expect_keys(&json!([1, 2]), &["status"]).is_err());
    }

    #[test]
    fn test_expect_str_and_number() {
        let body = json!({"message": "User created successfully", "userId": 12});
        assert!(expect_str(&body, "message", "User created successfully").is_ok());
        assert!(expect_str(&body, "message", "Login successful").is_err());
        assert!(expect_str(&body, "userId", "12").is_err());
        assert!(expect_number(&body, "userId").is_ok());
        assert!(expect_number(&body, "message").is_err());
        assert!(expect_number(&body, "missing").is_err());
    }

    #[test]
    fn test_expect_error_message() {
        let res = response(404, json!({"error": "Item not found"}));
        assert!(expect_error_message(&res, 404, "Item not found").is_ok());
        assert!(expect_error_message(&res, 404, "Route not found").is_err());
        assert!(expect_error_message(&res, 400, "Item not found").is_err());
    }

    #[test]
    fn test_jwt_shape() {
        assert!(is_jwt_shaped("aaa.bbb.ccc"));
        assert!(!is_jwt_shaped("aaa.bbb"));
        assert!(!is_jwt_shaped("aaa.bbb.ccc.ddd"));
        assert!(!is_jwt_shaped("aaa..ccc"));
        assert!(!is_jwt_shaped("invalid-token"));
    }
}
