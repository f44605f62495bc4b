//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `CBV_DEBUG` | `debug` |
//! | `CBV_LOG_LEVEL` | `log_level` |
//! | `CBV_BIND_ADDRESS` | `bind_address` |
//! | `CBV_TEMPLATE_DIRS` | `template_dirs` (comma-separated) |
//! | `CBV_PAGE_KWARG` | `page_kwarg` |
//! | `CBV_SORT_KWARG` | `sort_kwarg` |

use std::path::{Path, PathBuf};

use crate::error::CbvError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Fields not present in the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, CbvError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| CbvError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, CbvError> {
    from_toml_str(&read_config(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, CbvError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, CbvError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| CbvError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, CbvError> {
    from_json_str(&read_config(path.as_ref(), "JSON")?)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, CbvError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a file, picking the format from its extension
/// (`.json` is JSON, anything else TOML), then applies environment overrides.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, CbvError> {
    let path = path.as_ref();
    if path.extension().is_some_and(|ext| ext == "json") {
        from_json_file_with_env(path)
    } else {
        from_toml_file_with_env(path)
    }
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `CBV_*` environment variable overrides to a settings struct.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("CBV_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("CBV_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("CBV_BIND_ADDRESS") {
        settings.bind_address = val;
    }

    if let Ok(val) = std::env::var("CBV_TEMPLATE_DIRS") {
        settings.template_dirs = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
    }

    if let Ok(val) = std::env::var("CBV_PAGE_KWARG") {
        settings.page_kwarg = val;
    }

    if let Ok(val) = std::env::var("CBV_SORT_KWARG") {
        settings.sort_kwarg = val;
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> Result<String, CbvError> {
    std::fs::read_to_string(path).map_err(|e| {
        CbvError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

/// Deep-merges `overrides` over the serialized default settings.
fn merge_over_defaults(overrides: serde_json::Value, format: &str) -> Result<Settings, CbvError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        CbvError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, overrides);
    serde_json::from_value(merged).map_err(|e| {
        CbvError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "warn"
            template_dirs = ["templates", "shared/templates"]
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.template_dirs.len(), 2);
        // Defaults preserved
        assert_eq!(settings.page_kwarg, "page");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.sort_kwarg, "sort_by");
    }

    #[test]
    fn test_from_toml_str_extra() {
        let toml = r#"
            [extra]
            site_name = "Bookshelf"
        "#;
        let settings = from_toml_str(toml).unwrap();
        assert_eq!(
            settings.extra.get("site_name"),
            Some(&serde_json::json!("Bookshelf"))
        );
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("debug = ");
        assert!(matches!(result, Err(CbvError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let result = from_toml_str("debug = \"sometimes\"");
        assert!(matches!(result, Err(CbvError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{"page_kwarg": "p", "autoescape": false}"#;
        let settings = from_json_str(json).unwrap();
        assert_eq!(settings.page_kwarg, "p");
        assert!(!settings.autoescape);
        assert_eq!(settings.sort_kwarg, "sort_by");
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{not json").is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "bind_address = \"0.0.0.0:9000\"").unwrap();
        let settings = from_toml_file(file.path()).unwrap();
        assert_eq!(settings.bind_address, "0.0.0.0:9000");
    }

    #[test]
    fn test_from_file_picks_json_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{{\"log_level\": \"debug\"}}").unwrap();
        let settings = from_file_with_env(file.path()).unwrap();
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_missing_file() {
        let result = from_toml_file("/nonexistent/cbv-settings.toml");
        match result {
            Err(CbvError::ConfigurationError(msg)) => assert!(msg.contains("Failed to read")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"a": {"b": 1, "c": 2}, "d": 3});
        let over = serde_json::json!({"a": {"c": 20}});
        let merged = merge_json(base, over);
        assert_eq!(merged, serde_json::json!({"a": {"b": 1, "c": 20}, "d": 3}));
    }
}
