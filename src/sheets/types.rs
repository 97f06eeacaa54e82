use serde::Deserialize;

/// Configuration of one dashboard card, bound to one sheet tab.
///
/// Created server-side per user; read-only here and immutable for the
/// duration of a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardConfig {
  pub title: String,
  pub sheet_id: String,
  pub sheet_name: String,
  /// How many distinct numbers the card needs before it counts as complete.
  /// Upstream sometimes omits this; a missing target means zero.
  #[serde(default)]
  pub target_count: u32,
}

/// One spreadsheet row: loosely typed cells in column order.
///
/// Only two column positions carry meaning, by convention of the source
/// sheets (see `card::COL_USER` and `card::COL_NUMBER`); everything else is
/// opaque.
pub type SheetEntry = Vec<serde_json::Value>;
