//! Thin client for the remote spreadsheet gateway.
//!
//! The backend is a single script endpoint that multiplexes every operation
//! over an `action` name. Read-style actions go out as GET with the payload
//! in the query string; everything else is a POST with a JSON body. The
//! client separates transport failures and script-reported failures from
//! successes; envelope normalization is left to the calling operation.

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use url::Url;

use super::error::ApiError;

/// Actions routed as GET even if a future rename drops the `get` prefix.
const GET_ACTIONS: &[&str] = &["getAllUsers", "getSheetData"];

/// The script expects POST bodies as plain text containing JSON.
const POST_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

const UNKNOWN_API_ERROR: &str = "unknown error reported by the remote script";

#[derive(Debug, Clone)]
pub struct SheetsClient {
  http: reqwest::Client,
  endpoint: Url,
}

impl SheetsClient {
  pub fn new(endpoint: Url) -> Self {
    Self {
      http: reqwest::Client::new(),
      endpoint,
    }
  }

  /// Issue `action` against the endpoint and return the parsed payload.
  pub async fn call(&self, action: &str, payload: Map<String, Value>) -> Result<Value, ApiError> {
    let response = if uses_get(action) {
      let url = build_get_url(&self.endpoint, action, &payload);
      self.http.get(url).send().await?
    } else {
      let mut body = Map::new();
      body.insert("action".to_string(), Value::String(action.to_string()));
      body.extend(payload);

      self
        .http
        .post(self.endpoint.clone())
        .header(CONTENT_TYPE, POST_CONTENT_TYPE)
        .body(Value::Object(body).to_string())
        .send()
        .await?
    };

    let status = response.status();
    let body = response.text().await?;
    parse_response(status, &body)
  }
}

/// GET for read-style actions, POST for everything else.
fn uses_get(action: &str) -> bool {
  action.starts_with("load") || action.starts_with("get") || GET_ACTIONS.contains(&action)
}

/// Append `action` and every non-null payload entry as query parameters.
fn build_get_url(endpoint: &Url, action: &str, payload: &Map<String, Value>) -> Url {
  let mut url = endpoint.clone();
  {
    let mut pairs = url.query_pairs_mut();
    pairs.append_pair("action", action);
    for (key, value) in payload {
      match value {
        Value::Null => {}
        Value::String(s) => {
          pairs.append_pair(key, s);
        }
        other => {
          pairs.append_pair(key, &other.to_string());
        }
      }
    }
  }
  url
}

/// Sort a raw transport response into the error taxonomy.
fn parse_response(status: StatusCode, body: &str) -> Result<Value, ApiError> {
  if !status.is_success() {
    return Err(ApiError::Network {
      status: status.as_u16(),
      status_text: status.canonical_reason().unwrap_or_default().to_string(),
      body: body.to_string(),
    });
  }

  let payload: Value = serde_json::from_str(body)?;

  if let Some(message) = reported_error(&payload) {
    return Err(ApiError::Api { message });
  }

  Ok(payload)
}

/// A 2xx payload can still signal failure: a truthy `error` field, or
/// `success` equal to `false`. The reported message is used when it is a
/// usable string, a generic one otherwise.
fn reported_error(payload: &Value) -> Option<String> {
  let error = payload
    .get("error")
    .filter(|value| super::api_types::truthy(value));
  let failed = matches!(payload.get("success"), Some(Value::Bool(false)));

  if error.is_none() && !failed {
    return None;
  }

  Some(match error {
    Some(Value::String(message)) => message.clone(),
    _ => UNKNOWN_API_ERROR.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn endpoint() -> Url {
    Url::parse("https://example.com/exec").unwrap()
  }

  fn payload(entries: &[(&str, Value)]) -> Map<String, Value> {
    entries
      .iter()
      .map(|(k, v)| (k.to_string(), v.clone()))
      .collect()
  }

  #[test]
  fn test_read_actions_use_get() {
    assert!(uses_get("getAllUsers"));
    assert!(uses_get("getSheetData"));
    assert!(uses_get("loadSettings"));
    assert!(uses_get("getSomethingNew"));
  }

  #[test]
  fn test_other_actions_use_post() {
    assert!(!uses_get("saveSettings"));
    assert!(!uses_get("deleteUser"));
    assert!(!uses_get("ping"));
  }

  #[test]
  fn test_get_url_carries_action_and_params() {
    let url = build_get_url(
      &endpoint(),
      "getSheetData",
      &payload(&[
        ("sheetId", json!("1abc")),
        ("sheetName", json!("Sheet1")),
        ("date", json!("2024-05-01")),
      ]),
    );

    let query: Vec<(String, String)> = url
      .query_pairs()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    assert_eq!(query[0], ("action".to_string(), "getSheetData".to_string()));
    assert!(query.contains(&("sheetId".to_string(), "1abc".to_string())));
    assert!(query.contains(&("date".to_string(), "2024-05-01".to_string())));
  }

  #[test]
  fn test_get_url_skips_null_params() {
    let url = build_get_url(
      &endpoint(),
      "getAllUsers",
      &payload(&[("filter", Value::Null), ("limit", json!(10))]),
    );

    let query = url.query().unwrap();
    assert!(!query.contains("filter"));
    assert!(query.contains("limit=10"));
  }

  #[test]
  fn test_non_2xx_is_a_network_error() {
    let err = parse_response(StatusCode::INTERNAL_SERVER_ERROR, "server down").unwrap_err();
    match err {
      ApiError::Network {
        status,
        status_text,
        body,
      } => {
        assert_eq!(status, 500);
        assert_eq!(status_text, "Internal Server Error");
        assert_eq!(body, "server down");
      }
      other => panic!("expected Network, got {other:?}"),
    }
  }

  #[test]
  fn test_reported_error_field_fails_the_call() {
    let err = parse_response(StatusCode::OK, r#"{"error": "bad sheet"}"#).unwrap_err();
    assert_eq!(err.to_string(), "bad sheet");
  }

  #[test]
  fn test_success_false_without_message_uses_fallback() {
    let err = parse_response(StatusCode::OK, r#"{"success": false}"#).unwrap_err();
    assert_eq!(err.to_string(), UNKNOWN_API_ERROR);
  }

  #[test]
  fn test_empty_error_string_is_not_a_failure() {
    let payload = parse_response(StatusCode::OK, r#"{"error": "", "users": []}"#).unwrap();
    assert_eq!(payload["users"], json!([]));
  }

  #[test]
  fn test_success_payload_passes_through_unchanged() {
    let payload = parse_response(StatusCode::OK, r#"{"success": true, "users": ["a"]}"#).unwrap();
    assert_eq!(payload, json!({"success": true, "users": ["a"]}));
  }

  #[test]
  fn test_bare_array_payload_passes_through() {
    let payload = parse_response(StatusCode::OK, r#"[["a", 1], ["b", 2]]"#).unwrap();
    assert!(payload.is_array());
  }

  #[test]
  fn test_invalid_json_is_a_decode_error() {
    let err = parse_response(StatusCode::OK, "<html>oops</html>").unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
  }
}
