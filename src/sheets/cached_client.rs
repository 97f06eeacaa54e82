//! The domain fetch operations, layered on the gateway client and the
//! shared row cache.

use serde_json::{Map, Value};

use crate::cache::MemoryCache;

use super::api_types::{decode_tolerant, RowsEnvelope, SettingsEnvelope, UsersEnvelope};
use super::cache::SheetDataKey;
use super::client::SheetsClient;
use super::error::ApiError;
use super::types::{CardConfig, SheetEntry};

/// Page-lifetime cache of fetched rows keyed by sheet + tab + date.
pub type SheetCache = MemoryCache<Vec<SheetEntry>>;

/// Client wrapper that owns the row cache.
///
/// Users and card configs are fetched fresh on every call; only dated row
/// fetches are cached, and only until [`CachedSheetsClient::reset_cache`]
/// (logout or a global-date change).
#[derive(Clone)]
pub struct CachedSheetsClient {
  inner: SheetsClient,
  cache: SheetCache,
}

impl CachedSheetsClient {
  pub fn new(inner: SheetsClient) -> Self {
    Self {
      inner,
      cache: SheetCache::new(),
    }
  }

  pub fn cache(&self) -> &SheetCache {
    &self.cache
  }

  /// Drop every cached row set.
  pub fn reset_cache(&self) {
    self.cache.reset();
  }

  /// List every user known to the backend.
  ///
  /// A malformed `users` field degrades to an empty list, not an error.
  pub async fn fetch_all_users(&self) -> Result<Vec<String>, ApiError> {
    let payload = self.inner.call("getAllUsers", Map::new()).await?;
    let users = decode_tolerant::<UsersEnvelope>("getAllUsers", payload)
      .map(|envelope| envelope.users)
      .unwrap_or_default();
    Ok(users)
  }

  /// Load the card configs for one user. Same empty-list fallback.
  pub async fn fetch_user_settings(&self, username: &str) -> Result<Vec<CardConfig>, ApiError> {
    let mut params = Map::new();
    params.insert("username".to_string(), Value::String(username.to_string()));

    let payload = self.inner.call("loadSettings", params).await?;
    let configs = decode_tolerant::<SettingsEnvelope>("loadSettings", payload)
      .map(|envelope| envelope.config)
      .unwrap_or_default();
    Ok(configs)
  }

  /// Load the rows for one sheet tab on one date, consulting the cache.
  ///
  /// Empty identifiers are caller programming errors and fail before any
  /// network I/O. A populated cache key is served with no network call at
  /// all; a miss fetches, normalizes, stores, and returns.
  pub async fn fetch_sheet_data(
    &self,
    sheet_id: &str,
    sheet_name: &str,
    date: &str,
  ) -> Result<Vec<SheetEntry>, ApiError> {
    if sheet_id.is_empty() {
      return Err(ApiError::MissingParam("sheetId"));
    }
    if sheet_name.is_empty() {
      return Err(ApiError::MissingParam("sheetName"));
    }
    if date.is_empty() {
      return Err(ApiError::MissingParam("date"));
    }

    let key = SheetDataKey::new(sheet_id, sheet_name, date);
    let fetch_key = key.clone();
    let inner = self.inner.clone();

    self
      .cache
      .get_or_fetch(&key, || async move {
        let mut params = Map::new();
        params.insert("sheetId".to_string(), Value::String(fetch_key.sheet_id));
        params.insert("sheetName".to_string(), Value::String(fetch_key.sheet_name));
        params.insert("date".to_string(), Value::String(fetch_key.date));

        let payload = inner.call("getSheetData", params).await?;
        Ok(normalize_rows(payload))
      })
      .await
  }
}

/// Accept bare rows or `{data: rows}`; anything else becomes an empty list.
fn normalize_rows(payload: Value) -> Vec<SheetEntry> {
  decode_tolerant::<RowsEnvelope>("getSheetData", payload)
    .map(RowsEnvelope::into_rows)
    .unwrap_or_default()
}
