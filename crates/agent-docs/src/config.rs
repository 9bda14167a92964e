//! Synchronization settings, loaded from a JSON object or from environment variables.

use crate::error::SyncError;
use serde::Deserialize;
use std::env;

/// Environment variable toggling the consistency verifier.
pub const ENV_VERIFY: &str = "AGENT_DOCS_VERIFY";
/// Environment variable toggling disk reads for unopened resources.
pub const ENV_LOAD_FROM_DISK: &str = "AGENT_DOCS_LOAD_FROM_DISK";
/// Environment variable toggling change-event computation for full-text updates.
pub const ENV_DIFF_FULL_TEXT: &str = "AGENT_DOCS_DIFF_FULL_TEXT";
/// Environment variable naming the workspace root URI.
pub const ENV_WORKSPACE_ROOT: &str = "AGENT_DOCS_WORKSPACE_ROOT";

/// Runtime configuration for a document registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    /// Run the consistency verifier when updates carry ground-truth metadata.
    pub verify_consistency: bool,
    /// Seed resources that were never opened from the content provider.
    pub load_unopened_from_disk: bool,
    /// Compute change events for full-text updates. When off, full-text updates report none.
    pub diff_full_text_updates: bool,
    /// Root of the workspace the client has open, if any.
    pub workspace_root_uri: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            verify_consistency: true,
            load_unopened_from_disk: true,
            diff_full_text_updates: true,
            workspace_root_uri: None,
        }
    }
}

/// Keys present in a JSON settings object. Absent keys leave the target untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SyncConfigOverrides {
    verify_consistency: Option<bool>,
    load_unopened_from_disk: Option<bool>,
    diff_full_text_updates: Option<bool>,
    workspace_root_uri: Option<String>,
}

/// Parse a boolean-like flag value.
///
/// Truthy: `1`, `true`, `yes`, `on`. Falsy: `0`, `false`, `no`, `off`, empty string.
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl SyncConfig {
    /// Decode from a JSON object with camelCase keys. Missing keys keep their defaults.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, SyncError> {
        let mut config = Self::default();
        config.merge_value(value)?;
        Ok(config)
    }

    /// Overwrite the settings named in a JSON object, keeping the rest.
    ///
    /// `null` is an empty object. On error `self` is unchanged.
    pub fn merge_value(&mut self, value: &serde_json::Value) -> Result<(), SyncError> {
        if value.is_null() {
            return Ok(());
        }
        let overrides: SyncConfigOverrides = serde_json::from_value(value.clone())
            .map_err(|e| SyncError::InvalidConfig(e.to_string()))?;

        if let Some(verify) = overrides.verify_consistency {
            self.verify_consistency = verify;
        }
        if let Some(load) = overrides.load_unopened_from_disk {
            self.load_unopened_from_disk = load;
        }
        if let Some(diff) = overrides.diff_full_text_updates {
            self.diff_full_text_updates = diff;
        }
        if let Some(root) = overrides.workspace_root_uri {
            self.workspace_root_uri = Some(root);
        }
        Ok(())
    }

    /// Load from process environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names.
    ///
    /// Unrecognized flag values are ignored with a warning and the default is kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |name: &str, default: bool| {
            let Some(raw) = lookup(name) else {
                return default;
            };
            parse_env_flag(&raw).unwrap_or_else(|| {
                tracing::warn!(name, value = raw.as_str(), "unrecognized flag value; using default");
                default
            })
        };

        Self {
            verify_consistency: flag(ENV_VERIFY, defaults.verify_consistency),
            load_unopened_from_disk: flag(ENV_LOAD_FROM_DISK, defaults.load_unopened_from_disk),
            diff_full_text_updates: flag(ENV_DIFF_FULL_TEXT, defaults.diff_full_text_updates),
            workspace_root_uri: lookup(ENV_WORKSPACE_ROOT)
                .map(|root| root.trim().to_string())
                .filter(|root| !root.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_parse_env_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn test_parse_env_flag_accepts_falsy_values() {
        for value in ["", "0", "false", "FALSE", " no ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
    }

    #[test]
    fn test_parse_env_flag_rejects_unknown_values() {
        assert_eq!(parse_env_flag("maybe"), None);
    }

    #[test]
    fn test_from_value_partial_object() {
        let config = SyncConfig::from_value(&json!({
            "verifyConsistency": false,
            "workspaceRootUri": "file:///work"
        }))
        .unwrap();
        assert!(!config.verify_consistency);
        assert!(config.load_unopened_from_disk);
        assert_eq!(config.workspace_root_uri.as_deref(), Some("file:///work"));
        assert_eq!(SyncConfig::from_value(&serde_json::Value::Null).unwrap(), SyncConfig::default());
    }

    #[test]
    fn test_from_value_rejects_wrong_types() {
        let err = SyncConfig::from_value(&json!({ "verifyConsistency": "sometimes" })).unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig(_)));
    }

    #[test]
    fn test_merge_value_keeps_unnamed_settings() {
        let mut config = SyncConfig {
            load_unopened_from_disk: false,
            workspace_root_uri: Some("file:///env".to_string()),
            ..SyncConfig::default()
        };
        config
            .merge_value(&json!({ "verifyConsistency": false, "unknownSetting": 3 }))
            .unwrap();
        assert!(!config.verify_consistency);
        assert!(!config.load_unopened_from_disk);
        assert!(config.diff_full_text_updates);
        assert_eq!(config.workspace_root_uri.as_deref(), Some("file:///env"));

        let before = config.clone();
        assert!(config.merge_value(&json!({ "diffFullTextUpdates": 1 })).is_err());
        assert_eq!(config, before);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_VERIFY, "off"),
            (ENV_DIFF_FULL_TEXT, "perhaps"),
            (ENV_WORKSPACE_ROOT, "  "),
        ]);
        let config = SyncConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert!(!config.verify_consistency);
        assert!(config.load_unopened_from_disk);
        assert!(config.diff_full_text_updates);
        assert_eq!(config.workspace_root_uri, None);
    }
}
