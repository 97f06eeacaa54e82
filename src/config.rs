use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Custom title for the header (defaults to the endpoint host if not set)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// The spreadsheet gateway endpoint every action is issued against.
  pub url: String,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./sheetdash.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/sheetdash/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/sheetdash/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("sheetdash.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("sheetdash").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// The gateway endpoint, validated as a URL.
  ///
  /// SHEETDASH_API_URL overrides the configured endpoint when set.
  pub fn endpoint(&self) -> Result<Url> {
    let raw = std::env::var("SHEETDASH_API_URL").unwrap_or_else(|_| self.api.url.clone());

    Url::parse(&raw).map_err(|e| eyre!("Invalid API endpoint URL '{}': {}", raw, e))
  }

  /// Header title: configured, or the endpoint host.
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.title {
      return title.clone();
    }
    self
      .endpoint()
      .ok()
      .and_then(|url| url.host_str().map(String::from))
      .unwrap_or_else(|| "sheetdash".to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parses_minimal_config() {
    let config: Config = serde_yaml::from_str(
      "api:\n  url: https://example.com/macros/exec\ntitle: Night Shift\n",
    )
    .unwrap();
    assert_eq!(config.api.url, "https://example.com/macros/exec");
    assert_eq!(config.display_title(), "Night Shift");
  }

  #[test]
  fn test_missing_api_url_fails_to_parse() {
    assert!(serde_yaml::from_str::<Config>("title: x\n").is_err());
  }

  #[test]
  fn test_default_title_falls_back_to_host() {
    let config: Config =
      serde_yaml::from_str("api:\n  url: https://example.com/macros/exec\n").unwrap();
    assert_eq!(config.display_title(), "example.com");
  }
}
