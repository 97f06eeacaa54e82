//! Completion math for one dashboard card.
//!
//! A card watches one sheet tab: the rows submitted for a date are reduced
//! to the distinct checked numbers and the distinct submitting users, and
//! the number count is compared against the card's target.

use std::collections::HashSet;

use serde_json::Value;

use crate::sheets::api_types::truthy;
use crate::sheets::types::SheetEntry;

/// Column index of the submitting user, fixed by convention of the source
/// sheets.
pub const COL_USER: usize = 7;
/// Column index of the checked number, same convention.
pub const COL_NUMBER: usize = 9;

/// Whether a card's rows satisfy its target count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
  Complete,
  Incomplete { needed: u32 },
}

/// Distinct-value summary of one card's rows for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSummary {
  /// Distinct checked numbers, first-seen order.
  pub unique_numbers: Vec<String>,
  /// Distinct submitting users, first-seen order.
  pub unique_users: Vec<String>,
  pub completion: Completion,
}

impl CardSummary {
  /// Pure reduction over already-fetched rows; no I/O, no incremental state.
  pub fn compute(entries: &[SheetEntry], target_count: u32) -> Self {
    let unique_numbers = distinct_at(entries, COL_NUMBER);
    let unique_users = distinct_at(entries, COL_USER);

    let count = unique_numbers.len() as u32;
    let completion = if count >= target_count {
      Completion::Complete
    } else {
      Completion::Incomplete {
        needed: target_count - count,
      }
    };

    Self {
      unique_numbers,
      unique_users,
      completion,
    }
  }

  pub fn is_complete(&self) -> bool {
    matches!(self.completion, Completion::Complete)
  }
}

/// Distinct present values in one column, preserving first-seen order.
///
/// Deduplication is by value equality over the JSON value itself, so the
/// string `"1"` and the number `1` stay distinct. Absent and falsy cells
/// (null, empty string, `0`, `false`) are skipped.
fn distinct_at(entries: &[SheetEntry], index: usize) -> Vec<String> {
  let mut seen = HashSet::new();
  let mut values = Vec::new();

  for row in entries {
    let Some(cell) = row.get(index) else {
      continue;
    };
    if !truthy(cell) {
      continue;
    }
    // The JSON encoding keeps the value's type in the dedup identity.
    if seen.insert(cell.to_string()) {
      values.push(display_cell(cell));
    }
  }

  values
}

/// A cell rendered for display: strings without their JSON quotes,
/// everything else as its JSON form.
fn display_cell(cell: &Value) -> String {
  match cell {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  /// Build a row with the conventional user and number columns populated.
  fn row(user: Value, number: Value) -> SheetEntry {
    let mut cells = vec![Value::Null; 10];
    cells[COL_USER] = user;
    cells[COL_NUMBER] = number;
    cells
  }

  #[test]
  fn test_duplicate_numbers_count_once() {
    let entries = vec![
      row(json!("alice"), json!("1")),
      row(json!("bob"), json!("1")),
      row(json!("alice"), json!("2")),
    ];

    let summary = CardSummary::compute(&entries, 2);
    assert_eq!(summary.unique_numbers, vec!["1", "2"]);
    assert_eq!(summary.unique_users, vec!["alice", "bob"]);
    assert_eq!(summary.completion, Completion::Complete);
  }

  #[test]
  fn test_incomplete_reports_how_many_are_missing() {
    let entries = vec![
      row(json!("alice"), json!("1")),
      row(json!("alice"), json!("1")),
      row(json!("alice"), json!("2")),
    ];

    let summary = CardSummary::compute(&entries, 3);
    assert_eq!(summary.unique_numbers.len(), 2);
    assert_eq!(summary.completion, Completion::Incomplete { needed: 1 });
    assert!(!summary.is_complete());
  }

  #[test]
  fn test_zero_target_is_trivially_complete() {
    let summary = CardSummary::compute(&[], 0);
    assert!(summary.is_complete());
    assert!(summary.unique_numbers.is_empty());
  }

  #[test]
  fn test_falsy_cells_are_skipped() {
    let entries = vec![
      row(json!(""), json!(null)),
      row(json!(0), json!(false)),
      row(json!("carol"), json!("7")),
    ];

    let summary = CardSummary::compute(&entries, 1);
    assert_eq!(summary.unique_users, vec!["carol"]);
    assert_eq!(summary.unique_numbers, vec!["7"]);
  }

  #[test]
  fn test_string_and_number_cells_stay_distinct() {
    let entries = vec![row(json!("alice"), json!("1")), row(json!("alice"), json!(1))];

    let summary = CardSummary::compute(&entries, 2);
    assert_eq!(summary.unique_numbers, vec!["1", "1"]);
    assert_eq!(summary.completion, Completion::Complete);
  }

  #[test]
  fn test_short_rows_are_tolerated() {
    let entries = vec![vec![json!("only one cell")], Vec::new()];

    let summary = CardSummary::compute(&entries, 1);
    assert!(summary.unique_numbers.is_empty());
    assert_eq!(summary.completion, Completion::Incomplete { needed: 1 });
  }
}
