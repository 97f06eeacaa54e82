//! Serde-deserializable envelopes for the remote endpoint's responses.
//!
//! These are separate from the domain types so each operation can decode
//! tolerantly: the backend is a spreadsheet script with no schema
//! enforcement, and its success shapes drift. Every expected shape is an
//! explicit type here; anything that doesn't match falls back to an empty
//! collection at the call site instead of failing the operation.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::types::{CardConfig, SheetEntry};

/// `getAllUsers` success envelope.
#[derive(Debug, Deserialize)]
pub struct UsersEnvelope {
  pub users: Vec<String>,
}

/// `loadSettings` success envelope.
#[derive(Debug, Deserialize)]
pub struct SettingsEnvelope {
  pub config: Vec<CardConfig>,
}

/// `getSheetData` success shapes: the script returns either the rows
/// themselves or an object wrapping them under `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RowsEnvelope {
  Bare(Vec<SheetEntry>),
  Wrapped { data: Vec<SheetEntry> },
}

impl RowsEnvelope {
  pub fn into_rows(self) -> Vec<SheetEntry> {
    match self {
      RowsEnvelope::Bare(rows) => rows,
      RowsEnvelope::Wrapped { data } => data,
    }
  }
}

/// Decode an operation's envelope from the raw payload.
///
/// Returns `None` on shape mismatch; the caller substitutes an empty
/// collection. The mismatch is logged, not raised, so these reads stay
/// available when the upstream drifts.
pub fn decode_tolerant<T: DeserializeOwned>(operation: &str, payload: Value) -> Option<T> {
  match serde_json::from_value(payload) {
    Ok(decoded) => Some(decoded),
    Err(err) => {
      warn!(operation, %err, "unexpected response shape, substituting empty result");
      None
    }
  }
}

/// Truthiness in the sense of the upstream script's own language: null,
/// `false`, `0`, and the empty string don't count.
pub fn truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_users_envelope_decodes() {
    let env: UsersEnvelope = decode_tolerant("getAllUsers", json!({"users": ["a", "b"]})).unwrap();
    assert_eq!(env.users, vec!["a", "b"]);
  }

  #[test]
  fn test_users_envelope_rejects_wrong_type() {
    assert!(decode_tolerant::<UsersEnvelope>("getAllUsers", json!({"users": "a"})).is_none());
    assert!(decode_tolerant::<UsersEnvelope>("getAllUsers", json!({})).is_none());
    assert!(decode_tolerant::<UsersEnvelope>("getAllUsers", json!({"users": [1, 2]})).is_none());
  }

  #[test]
  fn test_settings_envelope_decodes_card_configs() {
    let env: SettingsEnvelope = decode_tolerant(
      "loadSettings",
      json!({"config": [
        {"title": "Zone A", "sheetId": "s1", "sheetName": "Sheet1", "targetCount": 5}
      ]}),
    )
    .unwrap();
    assert_eq!(env.config.len(), 1);
    assert_eq!(env.config[0].sheet_id, "s1");
    assert_eq!(env.config[0].target_count, 5);
  }

  #[test]
  fn test_settings_envelope_defaults_missing_target() {
    let env: SettingsEnvelope = decode_tolerant(
      "loadSettings",
      json!({"config": [{"title": "Zone A", "sheetId": "s1", "sheetName": "Sheet1"}]}),
    )
    .unwrap();
    assert_eq!(env.config[0].target_count, 0);
  }

  #[test]
  fn test_rows_envelope_accepts_bare_rows() {
    let env: RowsEnvelope =
      decode_tolerant("getSheetData", json!([["a", 1], ["b", 2]])).unwrap();
    assert_eq!(env.into_rows().len(), 2);
  }

  #[test]
  fn test_rows_envelope_accepts_wrapped_rows() {
    let env: RowsEnvelope = decode_tolerant("getSheetData", json!({"data": [["a"]]})).unwrap();
    assert_eq!(env.into_rows(), vec![vec![json!("a")]]);
  }

  #[test]
  fn test_rows_envelope_rejects_other_shapes() {
    assert!(decode_tolerant::<RowsEnvelope>("getSheetData", json!({})).is_none());
    assert!(decode_tolerant::<RowsEnvelope>("getSheetData", json!(null)).is_none());
    assert!(decode_tolerant::<RowsEnvelope>("getSheetData", json!({"data": "rows"})).is_none());
  }

  #[test]
  fn test_truthy_matches_script_semantics() {
    assert!(!truthy(&json!(null)));
    assert!(!truthy(&json!(false)));
    assert!(!truthy(&json!(0)));
    assert!(!truthy(&json!("")));
    assert!(truthy(&json!("0")));
    assert!(truthy(&json!(7)));
    assert!(truthy(&json!([])));
  }
}
