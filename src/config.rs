use serde::{Deserialize, Serialize};
use std::{
    env,
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::types::{EliminationType, DEFAULT_MERGE_OFFSET};

pub const CONFIG_PATH_ENV: &str = "BRACKET_LAYOUT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "bracket_layout.json";

// ── Config types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub merge_offset: f64,
    pub box_width: f64,
    pub box_height: f64,
    pub column_gap: f64,
    pub row_gap: f64,
    pub partition_gap: f64,
    pub single_elim_labels: bool,
    /// `None` infers the elimination type from the match set.
    pub elimination: Option<EliminationType>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            merge_offset: DEFAULT_MERGE_OFFSET,
            box_width: 220.0,
            box_height: 64.0,
            column_gap: 48.0,
            row_gap: 16.0,
            partition_gap: 48.0,
            single_elim_labels: true,
            elimination: None,
        }
    }
}

// ── Loading ────────────────────────────────────────────────────────────

pub fn config_path() -> PathBuf {
  env_default(CONFIG_PATH_ENV)
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

pub fn parse_flag(value: &str) -> bool {
  let value = value.trim().to_ascii_lowercase();
  matches!(value.as_str(), "1" | "true" | "yes" | "on")
}

pub fn apply_env_defaults(mut config: LayoutConfig) -> LayoutConfig {
  if let Some(value) = env_default("BRACKET_MERGE_OFFSET") {
    match value.parse::<f64>() {
      Ok(offset) if offset.is_finite() => config.merge_offset = offset,
      _ => warn!("ignoring BRACKET_MERGE_OFFSET={value:?}: not a number"),
    }
  }
  if let Some(value) = env_default("BRACKET_ELIMINATION") {
    match EliminationType::parse(&value) {
      Some(elimination) => config.elimination = Some(elimination),
      None => warn!("ignoring BRACKET_ELIMINATION={value:?}: expected single or double"),
    }
  }
  if let Some(value) = env_default("BRACKET_SINGLE_ELIM_LABELS") {
    config.single_elim_labels = parse_flag(&value);
  }
  config
}

pub fn load_config() -> Result<LayoutConfig, String> {
  load_config_from(&config_path())
}

/// A missing file is not an error; defaults (plus env overrides) apply.
pub fn load_config_from(path: &Path) -> Result<LayoutConfig, String> {
  if !path.is_file() {
    return Ok(apply_env_defaults(LayoutConfig::default()));
  }
  let data = fs::read_to_string(path).map_err(|e| format!("read config {}: {e}", path.display()))?;
  let config = serde_json::from_str::<LayoutConfig>(&data)
    .map_err(|e| format!("parse config {}: {e}", path.display()))?;
  Ok(apply_env_defaults(config))
}

/// Load `KEY=VALUE` pairs from a `.env` file without clobbering the environment.
pub fn load_env_file(path: &Path) {
  if !path.is_file() {
    return;
  }
  let contents = match fs::read_to_string(path) {
    Ok(data) => data,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_line() {
        assert_eq!(parse_env_line("# comment"), None);
        assert_eq!(parse_env_line("   "), None);
        assert_eq!(parse_env_line("=value"), None);
        assert_eq!(
            parse_env_line("export BRACKET_ELIMINATION=double"),
            Some(("BRACKET_ELIMINATION".to_string(), "double".to_string()))
        );
        assert_eq!(
            parse_env_line("KEY=\"quoted # kept\""),
            Some(("KEY".to_string(), "quoted # kept".to_string()))
        );
        assert_eq!(
            parse_env_line("KEY=12.5 # trailing"),
            Some(("KEY".to_string(), "12.5".to_string()))
        );
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" on "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("nope"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{ "mergeOffset": 30.0, "elimination": "double" }"#).unwrap();
        assert_eq!(config.merge_offset, 30.0);
        assert_eq!(config.elimination, Some(EliminationType::Double));
        assert_eq!(config.box_width, LayoutConfig::default().box_width);
        assert!(config.single_elim_labels);
    }

    #[test]
    fn test_load_config_reports_bad_json() {
        let path = env::temp_dir().join(format!("bracket_layout_bad_{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        let err = load_config_from(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(err.starts_with("parse config"));
    }

    #[test]
    fn test_missing_config_file_is_default() {
        let path = env::temp_dir().join("bracket_layout_definitely_missing.json");
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.box_height, LayoutConfig::default().box_height);
    }
}
