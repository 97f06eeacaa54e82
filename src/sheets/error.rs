//! Error taxonomy for the remote gateway and the fetch operations.

use thiserror::Error;

/// Failures surfaced to callers of the sheets client.
///
/// Shape mismatches are deliberately NOT represented here: a response that
/// parses but doesn't match the expected envelope degrades to an empty
/// collection plus a warning, so the operations stay available when the
/// upstream drifts.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Non-2xx transport response, with the body read back as text.
  #[error("network error: {status} {status_text}. Details: {body}")]
  Network {
    status: u16,
    status_text: String,
    body: String,
  },

  /// 2xx response whose payload reports a failure (`{error}` or
  /// `{success: false}`).
  #[error("{message}")]
  Api { message: String },

  /// A required parameter was empty. Raised before any network call.
  #[error("{0} is required")]
  MissingParam(&'static str),

  /// The request could not be sent or the body could not be read.
  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),

  /// The response body was not valid JSON.
  #[error("invalid response body: {0}")]
  Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_network_error_mentions_status_and_body() {
    let err = ApiError::Network {
      status: 500,
      status_text: "Internal Server Error".to_string(),
      body: "server down".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("500"));
    assert!(msg.contains("server down"));
  }

  #[test]
  fn test_api_error_is_the_reported_message() {
    let err = ApiError::Api {
      message: "bad sheet".to_string(),
    };
    assert_eq!(err.to_string(), "bad sheet");
  }

  #[test]
  fn test_missing_param_names_the_parameter() {
    assert_eq!(
      ApiError::MissingParam("sheetId").to_string(),
      "sheetId is required"
    );
  }
}
