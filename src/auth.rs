//! Operator login for the dashboard.
//!
//! The dashboard ships with a single built-in operator account checked by
//! literal comparison. This is demo-grade gating, not authentication, and
//! is kept that way on purpose.

const OPERATOR_USERNAME: &str = "admin";
const OPERATOR_PASSWORD: &str = "global99";

/// Check a login attempt against the built-in operator account.
pub fn verify(username: &str, password: &str) -> bool {
  username == OPERATOR_USERNAME && password == OPERATOR_PASSWORD
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_operator_account_logs_in() {
    assert!(verify("admin", "global99"));
  }

  #[test]
  fn test_wrong_password_is_rejected() {
    assert!(!verify("admin", "admin"));
    assert!(!verify("admin", ""));
  }

  #[test]
  fn test_username_is_case_sensitive() {
    assert!(!verify("Admin", "global99"));
  }
}
