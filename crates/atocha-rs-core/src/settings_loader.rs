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
//! | `ATOCHA_DEBUG` | `debug` |
//! | `ATOCHA_LOG_LEVEL` | `log_level` |
//! | `ATOCHA_LANGUAGE_CODE` | `language_code` |
//! | `ATOCHA_COMPLETENESS_CHECKS` | `completeness_checks` |
//! | `ATOCHA_SCRIPTS_URL` | `scripts_url` |
//! | `ATOCHA_LABEL_COLON` | `label_colon` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use atocha_rs_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/forms.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::{AtochaError, AtochaResult};
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys absent from the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> AtochaResult<Settings> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| AtochaError::Configuration(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> AtochaResult<Settings> {
    from_toml_str(&read_file(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> AtochaResult<Settings> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> AtochaResult<Settings> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| AtochaError::Configuration(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> AtochaResult<Settings> {
    from_json_str(&read_file(path.as_ref(), "JSON")?)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `ATOCHA_*` environment variable overrides.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Applies overrides using an arbitrary variable lookup.
///
/// Boolean variables accept "true"/"1"/"yes" (anything else is false).
pub fn apply_overrides_from<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let flag = |val: &str| matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");

    if let Some(val) = lookup("ATOCHA_DEBUG") {
        settings.debug = flag(&val);
    }
    if let Some(val) = lookup("ATOCHA_LOG_LEVEL") {
        settings.log_level = val;
    }
    if let Some(val) = lookup("ATOCHA_LANGUAGE_CODE") {
        settings.language_code = val;
    }
    if let Some(val) = lookup("ATOCHA_COMPLETENESS_CHECKS") {
        settings.completeness_checks = flag(&val);
    }
    if let Some(val) = lookup("ATOCHA_SCRIPTS_URL") {
        settings.scripts_url = val;
    }
    if let Some(val) = lookup("ATOCHA_LABEL_COLON") {
        settings.label_colon = flag(&val);
    }
}

fn read_file(path: &Path, format: &str) -> AtochaResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        AtochaError::Configuration(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> AtochaResult<Settings> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        AtochaError::Configuration(format!("Failed to serialize default settings: {e}"))
    })?;
    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        AtochaError::Configuration(format!("Failed to deserialize settings from {format}: {e}"))
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
    use std::collections::HashMap;

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            language_code = "fr"
            scripts_url = "/static/js"
        "#;
        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.language_code, "fr");
        assert_eq!(settings.scripts_url, "/static/js");
        // Defaults preserved
        assert!(settings.completeness_checks);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_toml_str_empty() {
        assert_eq!(from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(matches!(result, Err(AtochaError::Configuration(_))));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let result = from_toml_str("completeness_checks = \"sometimes\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_json_str_basic() {
        let settings =
            from_json_str(r#"{"log_level": "debug", "label_colon": true}"#).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert!(settings.label_colon);
        assert!(settings.debug);
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{not json").is_err());
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = from_toml_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(AtochaError::Configuration(msg)) if msg.contains("here.toml")));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("ATOCHA_DEBUG", "0"),
            ("ATOCHA_COMPLETENESS_CHECKS", "no"),
            ("ATOCHA_LANGUAGE_CODE", "fr-ca"),
            ("ATOCHA_LABEL_COLON", "YES"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        apply_overrides_from(&mut settings, |name| vars.get(name).map(|v| (*v).to_string()));
        assert!(!settings.debug);
        assert!(!settings.completeness_checks);
        assert_eq!(settings.language_code, "fr-ca");
        assert!(settings.label_colon);
        assert_eq!(settings.scripts_url, "/scripts");
    }
}
