use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One templated configuration value declared by an egg.
///
/// `rules` is the raw pipe-delimited rule expression from the panel
/// (e.g. `"required|string|max:20"`); see `rules::parse_rule_string`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EggVariable {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub env_variable: String,
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub user_viewable: bool,
    #[serde(default)]
    pub user_editable: bool,
    #[serde(default)]
    pub rules: String,
}

impl EggVariable {
    /// The lower-cased environment key used for lookups against
    /// billing-side storage. The panel itself is case-sensitive, so the
    /// original `env_variable` casing is preserved on outbound payloads.
    pub fn billing_key(&self) -> String {
        self.env_variable.to_lowercase()
    }
}

/// An application template as served by the panel, with its declared
/// variables flattened out of the API relationship envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Egg {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub docker_image: String,
    pub startup: String,
    #[serde(default)]
    pub variables: Vec<EggVariable>,
}

impl Egg {
    /// Looks up a declared variable by its environment key, case-insensitively.
    pub fn variable(&self, env: &str) -> Option<&EggVariable> {
        self.variables
            .iter()
            .find(|v| v.env_variable.eq_ignore_ascii_case(env))
    }
}

/// A nest (egg category) on the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nest {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: String,
}

/// A deployable location on the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: u64,
    pub short: String,
    #[serde(default)]
    pub long: Option<String>,
}

/// A daemon node on the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: u64,
    pub name: String,
    pub fqdn: String,
    pub location_id: u64,
    #[serde(default)]
    pub memory: u64,
    #[serde(default)]
    pub disk: u64,
}

/// A provisioned server as reported by the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: u64,
    #[serde(default)]
    pub external_id: Option<String>,
    pub uuid: String,
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub suspended: bool,
    pub user: u64,
    pub node: u64,
    pub nest: u64,
    pub egg: u64,
    #[serde(default)]
    pub container: Option<ServerContainer>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Container details nested inside a server response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerContainer {
    pub startup_command: String,
    pub image: String,
    #[serde(default)]
    pub environment: HashMap<String, serde_json::Value>,
}

/// A panel user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelUser {
    pub id: u64,
    #[serde(default)]
    pub external_id: Option<String>,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub root_admin: bool,
}
