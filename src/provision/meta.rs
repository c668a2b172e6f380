// Billing-side inputs: package meta, submitted form fields, persisted
// service fields, and the client record used for panel account creation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("numeric pattern"));
static PORT_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+-[0-9]+$").expect("port range pattern"));

/// Flat key/value package configuration saved by the billing application.
///
/// Well-known keys: `nest_id`, `egg_id`, `location_id`, `memory`, `swap`,
/// `cpu`, `disk`, `io`, `image`, `startup`, `databases`, `allocations`,
/// `backups`, `dedicated_ip`, `port_range`, plus per-variable
/// `<lowercased_env>` default overrides and `<lowercased_env>_display`
/// client-visibility flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageMeta {
    pub values: HashMap<String, String>,
}

impl PackageMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_iter<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the value only when present and non-empty.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn u64_or_zero(&self, key: &str) -> u64 {
        self.get(key).and_then(|v| v.trim().parse().ok()).unwrap_or(0)
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("1") | Some("true") | Some("on"))
    }

    /// Whether the package exposes the given egg variable to clients.
    pub fn displays_to_client(&self, env_variable: &str) -> bool {
        self.flag(&format!("{}_display", env_variable.to_lowercase()))
    }

    /// Validates the well-known meta fields the way a package-save form
    /// would, returning one message per violation. Mirrors the checks run
    /// before a package is persisted: numeric ids and limits, and a
    /// `start-end[,start-end...]` port range.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for key in ["location_id", "nest_id", "egg_id"] {
            if !NUMERIC_RE.is_match(self.get(key).unwrap_or("")) {
                issues.push(format!("The {} field must be a numeric id.", key));
            }
        }

        for key in ["memory", "swap", "cpu", "disk", "io"] {
            if !NUMERIC_RE.is_match(self.get(key).unwrap_or("")) {
                issues.push(format!("The {} field must be a whole number.", key));
            }
        }

        // Feature limits may be blank (unlimited) but must otherwise be numeric.
        for key in ["databases", "allocations", "backups"] {
            if let Some(value) = self.get_non_empty(key) {
                if !NUMERIC_RE.is_match(value) {
                    issues.push(format!("The {} field must be blank or a whole number.", key));
                }
            }
        }

        if let Some(ranges) = self.get_non_empty("port_range") {
            if !ranges.split(',').all(|r| PORT_RANGE_RE.is_match(r)) {
                issues.push(
                    "The port_range field must be a comma-separated list of start-end ranges."
                        .to_string(),
                );
            }
        }

        issues
    }
}

/// Fields submitted with the current service add/edit request, plus any
/// configurable-option selections made at checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmittedFields {
    #[serde(default)]
    pub fields: HashMap<String, String>,
    #[serde(default)]
    pub config_options: HashMap<String, String>,
}

impl SubmittedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Looks up a configurable-option value for an egg variable, trying
    /// the declared environment key first and its billing-side lower-cased
    /// form second.
    pub fn config_option(&self, env_variable: &str) -> Option<&str> {
        self.config_options
            .get(env_variable)
            .or_else(|| self.config_options.get(&env_variable.to_lowercase()))
            .map(String::as_str)
    }
}

/// Service field values persisted from a previous add/edit, consulted on
/// edit so untouched variables keep their user-entered values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedFields {
    pub values: HashMap<String, String>,
}

impl PersistedFields {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// The billing client record a panel account is created from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingClient {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta_with_limits() -> PackageMeta {
        PackageMeta::from_iter([
            ("location_id", "4"),
            ("nest_id", "1"),
            ("egg_id", "3"),
            ("memory", "2048"),
            ("swap", "0"),
            ("cpu", "200"),
            ("disk", "10240"),
            ("io", "500"),
            ("port_range", "25565-25570,25580-25590"),
        ])
    }

    #[test]
    fn valid_meta_produces_no_issues() {
        assert!(meta_with_limits().validate().is_empty());
    }

    #[test]
    fn malformed_port_range_is_reported() {
        let mut meta = meta_with_limits();
        meta.values
            .insert("port_range".to_string(), "25565:25570".to_string());
        let issues = meta.validate();
        assert!(issues.iter().any(|i| i.contains("port_range")));
    }

    #[test]
    fn feature_limits_may_be_blank() {
        let mut meta = meta_with_limits();
        meta.values.insert("databases".to_string(), String::new());
        assert!(meta.validate().is_empty());

        meta.values.insert("databases".to_string(), "abc".to_string());
        assert!(!meta.validate().is_empty());
    }

    #[test]
    fn display_flags_use_lowercased_keys() {
        let meta = PackageMeta::from_iter([("server_jarfile_display", "1")]);
        assert!(meta.displays_to_client("SERVER_JARFILE"));
        assert!(!meta.displays_to_client("OTHER_VAR"));
    }

    #[test]
    fn config_option_lookup_falls_back_to_lowercase() {
        let mut submitted = SubmittedFields::new();
        submitted
            .config_options
            .insert("server_jarfile".to_string(), "custom.jar".to_string());
        assert_eq!(submitted.config_option("SERVER_JARFILE"), Some("custom.jar"));
    }
}
