// Parameter resolver - builds the outbound panel payloads for server
// create/update calls. Every egg variable gets exactly one value, chosen
// from the layered billing-side sources with first-match-wins precedence.

use crate::egg::Egg;
use crate::provision::{BillingClient, PackageMeta, PersistedFields, SubmittedFields};
use serde::Serialize;
use std::collections::BTreeMap;

/// Server resource limits, copied verbatim from package meta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerLimits {
    pub memory: u64,
    pub swap: u64,
    pub disk: u64,
    pub io: u64,
    pub cpu: u64,
}

/// Feature limits; `None` serializes as `null`, which the panel reads as
/// unlimited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureLimits {
    pub databases: Option<u64>,
    pub allocations: Option<u64>,
    pub backups: Option<u64>,
}

/// An inclusive allocation port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortRange(pub u32, pub u32);

/// Placement directives for the panel's deployment scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeployDirectives {
    pub locations: Vec<u64>,
    pub dedicated_ip: bool,
    pub port_range: Vec<PortRange>,
}

/// The full create-server payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerParameterSet {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub user: u64,
    pub nest: u64,
    pub egg: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack: Option<u64>,
    pub docker_image: String,
    pub startup: String,
    pub limits: ServerLimits,
    pub feature_limits: FeatureLimits,
    pub deploy: DeployDirectives,
    pub environment: BTreeMap<String, String>,
    pub start_on_completion: bool,
}

/// Payload for the details-update endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerDetailsUpdate {
    pub name: String,
    pub description: String,
    pub user: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// Payload for the build-update endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerBuildUpdate {
    pub limits: ServerLimits,
    pub feature_limits: FeatureLimits,
}

/// Payload for the startup-update endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerStartupUpdate {
    pub egg: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack: Option<u64>,
    pub image: String,
    pub startup: String,
    pub environment: BTreeMap<String, String>,
    pub skip_scripts: bool,
}

/// Payload for panel account creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCreationParameters {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub external_id: String,
}

/// Builds the panel account payload for a billing client, mirroring how
/// the billing side keys panel users by client email and id.
pub fn user_creation_parameters(client: &BillingClient) -> UserCreationParameters {
    UserCreationParameters {
        username: client.email.clone(),
        email: client.email.clone(),
        first_name: client.first_name.clone(),
        last_name: client.last_name.clone(),
        external_id: client.id.to_string(),
    }
}

/// Splits a `"start-end,start-end"` package field into structured pairs.
/// Tokens that do not parse are dropped here; format validation belongs to
/// the package-save rules, not the resolver.
pub fn parse_port_ranges(raw: &str) -> Vec<PortRange> {
    raw.split(',')
        .filter(|token| !token.trim().is_empty())
        .filter_map(|token| {
            let (start, end) = token.trim().split_once('-')?;
            match (start.parse(), end.parse()) {
                (Ok(start), Ok(end)) => Some(PortRange(start, end)),
                _ => {
                    tracing::warn!(token, "ignoring unparseable port range token");
                    None
                }
            }
        })
        .collect()
}

/// Resolves outbound server parameters from an egg definition, package
/// meta, and the layered per-request value sources. Pure and stateless: the
/// same inputs always produce the same payload.
#[derive(Debug, Clone, Copy)]
pub struct ParameterResolver<'a> {
    egg: &'a Egg,
    meta: &'a PackageMeta,
    submitted: &'a SubmittedFields,
    /// Present only on edit; lets untouched variables keep their stored values.
    persisted: Option<&'a PersistedFields>,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(egg: &'a Egg, meta: &'a PackageMeta, submitted: &'a SubmittedFields) -> Self {
        Self {
            egg,
            meta,
            submitted,
            persisted: None,
        }
    }

    /// Switches the resolver into edit mode, consulting previously saved
    /// service fields between the submission and the package defaults.
    pub fn with_persisted(mut self, persisted: &'a PersistedFields) -> Self {
        self.persisted = Some(persisted);
        self
    }

    /// Resolves the environment map: one entry per declared egg variable,
    /// keyed by the original-case environment name. Per variable the first
    /// present source wins: configurable option, submitted field,
    /// persisted field (edit only), package default, egg default. A blank
    /// value does not count as present; an optional field left empty falls
    /// through to the egg default instead of blanking the variable.
    pub fn environment(&self) -> BTreeMap<String, String> {
        let mut environment = BTreeMap::new();

        for variable in &self.egg.variables {
            let key = variable.billing_key();
            let sources = [
                self.submitted.config_option(&variable.env_variable),
                self.submitted.field(&key),
                self.persisted.and_then(|p| p.get(&key)),
                self.meta.get(&key),
            ];

            let value = sources
                .into_iter()
                .flatten()
                .find(|v| !v.is_empty())
                .unwrap_or(&variable.default_value);

            environment.insert(variable.env_variable.clone(), value.to_string());
        }

        environment
    }

    /// Builds the full create-server payload for the given panel owner.
    pub fn server_creation_parameters(&self, user: u64) -> ServerParameterSet {
        ServerParameterSet {
            name: self.server_name(),
            description: self.server_description(),
            external_id: self.external_id(),
            user,
            nest: self.meta.u64_or_zero("nest_id"),
            egg: self.meta.u64_or_zero("egg_id"),
            pack: self.pack_id(),
            docker_image: self.docker_image(),
            startup: self.startup(),
            limits: self.limits(),
            feature_limits: self.feature_limits(),
            deploy: DeployDirectives {
                // The package models a single target location.
                locations: vec![self.meta.u64_or_zero("location_id")],
                dedicated_ip: self.meta.flag("dedicated_ip"),
                port_range: parse_port_ranges(self.meta.get("port_range").unwrap_or("")),
            },
            environment: self.environment(),
            start_on_completion: true,
        }
    }

    /// Builds the details-only update payload.
    pub fn server_edit_details_parameters(&self, user: u64) -> ServerDetailsUpdate {
        ServerDetailsUpdate {
            name: self.server_name(),
            description: self.server_description(),
            user,
            external_id: self.external_id(),
        }
    }

    /// Builds the resource/feature-limit update payload.
    pub fn server_edit_build_parameters(&self) -> ServerBuildUpdate {
        ServerBuildUpdate {
            limits: self.limits(),
            feature_limits: self.feature_limits(),
        }
    }

    /// Builds the startup/environment update payload.
    pub fn server_edit_startup_parameters(&self) -> ServerStartupUpdate {
        ServerStartupUpdate {
            egg: self.meta.u64_or_zero("egg_id"),
            pack: self.pack_id(),
            image: self.docker_image(),
            startup: self.startup(),
            environment: self.environment(),
            skip_scripts: false,
        }
    }

    fn server_name(&self) -> String {
        self.submitted
            .field("server_name")
            .or_else(|| self.meta.get_non_empty("server_name"))
            .unwrap_or("")
            .to_string()
    }

    fn server_description(&self) -> String {
        self.submitted
            .field("server_description")
            .unwrap_or("")
            .to_string()
    }

    fn external_id(&self) -> Option<String> {
        self.submitted
            .field("external_id")
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn pack_id(&self) -> Option<u64> {
        self.meta
            .get_non_empty("pack_id")
            .and_then(|v| v.trim().parse().ok())
    }

    /// Package override wins when non-empty, otherwise the egg default.
    fn docker_image(&self) -> String {
        self.meta
            .get_non_empty("image")
            .unwrap_or(&self.egg.docker_image)
            .to_string()
    }

    fn startup(&self) -> String {
        self.meta
            .get_non_empty("startup")
            .unwrap_or(&self.egg.startup)
            .to_string()
    }

    fn limits(&self) -> ServerLimits {
        ServerLimits {
            memory: self.meta.u64_or_zero("memory"),
            swap: self.meta.u64_or_zero("swap"),
            disk: self.meta.u64_or_zero("disk"),
            io: self.meta.u64_or_zero("io"),
            cpu: self.meta.u64_or_zero("cpu"),
        }
    }

    fn feature_limits(&self) -> FeatureLimits {
        FeatureLimits {
            databases: feature_limit(self.meta.get("databases")),
            allocations: feature_limit(self.meta.get("allocations")),
            backups: feature_limit(self.meta.get("backups")),
        }
    }
}

/// Normalizes a stored feature-limit field: blank or zero means unlimited.
fn feature_limit(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::egg::EggVariable;

    fn egg() -> Egg {
        Egg {
            id: 3,
            name: "Vanilla Minecraft".to_string(),
            description: None,
            docker_image: "quay.io/pterodactyl/core:java".to_string(),
            startup: "java -Xms128M -jar {{SERVER_JARFILE}}".to_string(),
            variables: vec![
                EggVariable {
                    name: "Server Jar File".to_string(),
                    description: "The jar to boot.".to_string(),
                    env_variable: "SERVER_JARFILE".to_string(),
                    default_value: "server.jar".to_string(),
                    user_viewable: true,
                    user_editable: true,
                    rules: "required|regex:/^([\\w\\d._-]+)(\\.jar)$/".to_string(),
                },
                EggVariable {
                    name: "Memory Limit".to_string(),
                    description: String::new(),
                    env_variable: "MEMORY_LIMIT".to_string(),
                    default_value: "256".to_string(),
                    user_viewable: true,
                    user_editable: true,
                    rules: "integer|min:128".to_string(),
                },
            ],
        }
    }

    fn meta() -> PackageMeta {
        PackageMeta::from_iter([
            ("nest_id", "1"),
            ("egg_id", "3"),
            ("location_id", "4"),
            ("memory", "2048"),
            ("swap", "0"),
            ("cpu", "200"),
            ("disk", "10240"),
            ("io", "500"),
            ("databases", ""),
            ("allocations", "2"),
            ("backups", "0"),
            ("dedicated_ip", "1"),
            ("port_range", "25565-25570,25580-25590"),
            ("memory_limit", "512"),
        ])
    }

    #[test]
    fn environment_covers_every_variable_exactly_once() {
        let egg = egg();
        let meta = meta();
        let submitted = SubmittedFields::new();
        let resolver = ParameterResolver::new(&egg, &meta, &submitted);

        let env = resolver.environment();
        assert_eq!(env.len(), 2);
        // No billing-side value for the jarfile: egg default applies, and
        // the key keeps its declared casing.
        assert_eq!(env.get("SERVER_JARFILE").map(String::as_str), Some("server.jar"));
        // Package meta overrides the egg default.
        assert_eq!(env.get("MEMORY_LIMIT").map(String::as_str), Some("512"));
    }

    #[test]
    fn submission_wins_over_package_default() {
        let egg = egg();
        let meta = meta();
        let mut submitted = SubmittedFields::new();
        submitted
            .fields
            .insert("memory_limit".to_string(), "1024".to_string());

        let env = ParameterResolver::new(&egg, &meta, &submitted).environment();
        assert_eq!(env.get("MEMORY_LIMIT").map(String::as_str), Some("1024"));
    }

    #[test]
    fn blank_submission_falls_through_to_defaults() {
        let egg = egg();
        let mut meta = meta();
        let mut submitted = SubmittedFields::new();
        submitted
            .fields
            .insert("memory_limit".to_string(), String::new());

        // Blank submission: the package default still applies.
        let env = ParameterResolver::new(&egg, &meta, &submitted).environment();
        assert_eq!(env.get("MEMORY_LIMIT").map(String::as_str), Some("512"));

        // Blank submission and blank package default: the egg default.
        meta.values.insert("memory_limit".to_string(), String::new());
        let env = ParameterResolver::new(&egg, &meta, &submitted).environment();
        assert_eq!(env.get("MEMORY_LIMIT").map(String::as_str), Some("256"));
    }

    #[test]
    fn config_option_wins_over_submission() {
        let egg = egg();
        let meta = meta();
        let mut submitted = SubmittedFields::new();
        submitted
            .fields
            .insert("memory_limit".to_string(), "1024".to_string());
        submitted
            .config_options
            .insert("memory_limit".to_string(), "4096".to_string());

        let env = ParameterResolver::new(&egg, &meta, &submitted).environment();
        assert_eq!(env.get("MEMORY_LIMIT").map(String::as_str), Some("4096"));
    }

    #[test]
    fn persisted_fields_only_apply_between_submission_and_meta() {
        let egg = egg();
        let meta = meta();
        let submitted = SubmittedFields::new();
        let persisted = PersistedFields {
            values: [("memory_limit".to_string(), "768".to_string())].into(),
        };

        // Edit: the saved value beats the package default.
        let env = ParameterResolver::new(&egg, &meta, &submitted)
            .with_persisted(&persisted)
            .environment();
        assert_eq!(env.get("MEMORY_LIMIT").map(String::as_str), Some("768"));

        // Add (no persisted fields): the package default is used.
        let env = ParameterResolver::new(&egg, &meta, &submitted).environment();
        assert_eq!(env.get("MEMORY_LIMIT").map(String::as_str), Some("512"));

        // A fresh submission still beats the saved value on edit.
        let mut submitted = SubmittedFields::new();
        submitted
            .fields
            .insert("memory_limit".to_string(), "1024".to_string());
        let env = ParameterResolver::new(&egg, &meta, &submitted)
            .with_persisted(&persisted)
            .environment();
        assert_eq!(env.get("MEMORY_LIMIT").map(String::as_str), Some("1024"));
    }

    #[test]
    fn creation_payload_assembles_all_sections() {
        let egg = egg();
        let meta = meta();
        let mut submitted = SubmittedFields::new();
        submitted
            .fields
            .insert("server_name".to_string(), "steve's server".to_string());

        let params = ParameterResolver::new(&egg, &meta, &submitted).server_creation_parameters(7);

        assert_eq!(params.name, "steve's server");
        assert_eq!(params.user, 7);
        assert_eq!(params.nest, 1);
        assert_eq!(params.egg, 3);
        assert_eq!(params.pack, None);
        assert_eq!(params.docker_image, "quay.io/pterodactyl/core:java");
        assert_eq!(params.limits.memory, 2048);
        assert_eq!(params.limits.io, 500);
        assert!(params.start_on_completion);
        assert_eq!(params.deploy.locations, vec![4]);
        assert!(params.deploy.dedicated_ip);
        assert_eq!(
            params.deploy.port_range,
            vec![PortRange(25565, 25570), PortRange(25580, 25590)]
        );
        assert_eq!(params.environment.len(), 2);
    }

    #[test]
    fn empty_and_zero_feature_limits_mean_unlimited() {
        let egg = egg();
        let meta = meta();
        let submitted = SubmittedFields::new();
        let params = ParameterResolver::new(&egg, &meta, &submitted).server_creation_parameters(1);

        assert_eq!(params.feature_limits.databases, None);
        assert_eq!(params.feature_limits.backups, None);
        assert_eq!(params.feature_limits.allocations, Some(2));

        let json = serde_json::to_value(&params.feature_limits).unwrap();
        assert_eq!(json["databases"], serde_json::Value::Null);
        assert_eq!(json["allocations"], 2);
    }

    #[test]
    fn package_overrides_beat_egg_runtime_defaults() {
        let egg = egg();
        let mut meta = meta();
        meta.values
            .insert("image".to_string(), "ghcr.io/custom:latest".to_string());
        meta.values.insert("startup".to_string(), String::new());
        let submitted = SubmittedFields::new();

        let params = ParameterResolver::new(&egg, &meta, &submitted).server_creation_parameters(1);
        assert_eq!(params.docker_image, "ghcr.io/custom:latest");
        // Empty override falls back to the egg's startup command.
        assert_eq!(params.startup, egg.startup);
    }

    #[test]
    fn resolution_is_idempotent() {
        let egg = egg();
        let meta = meta();
        let mut submitted = SubmittedFields::new();
        submitted
            .fields
            .insert("server_name".to_string(), "idem".to_string());
        let resolver = ParameterResolver::new(&egg, &meta, &submitted);

        let a = resolver.server_creation_parameters(9);
        let b = resolver.server_creation_parameters(9);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn empty_variable_list_yields_empty_environment() {
        let egg = Egg {
            id: 9,
            name: "Bare".to_string(),
            description: None,
            docker_image: "img".to_string(),
            startup: "run".to_string(),
            variables: Vec::new(),
        };
        let meta = meta();
        let submitted = SubmittedFields::new();
        let params = ParameterResolver::new(&egg, &meta, &submitted).server_creation_parameters(1);
        assert!(params.environment.is_empty());
    }

    #[test]
    fn port_ranges_parse_structured_pairs() {
        assert_eq!(
            parse_port_ranges("25565-25570,25580-25590"),
            vec![PortRange(25565, 25570), PortRange(25580, 25590)]
        );
        assert!(parse_port_ranges("").is_empty());
        assert_eq!(parse_port_ranges("1-2,junk,3-4").len(), 2);

        let json = serde_json::to_value(PortRange(25565, 25570)).unwrap();
        assert_eq!(json, serde_json::json!([25565, 25570]));
    }

    #[test]
    fn startup_edit_payload_reuses_environment_resolution() {
        let egg = egg();
        let meta = meta();
        let mut submitted = SubmittedFields::new();
        submitted
            .fields
            .insert("server_jarfile".to_string(), "custom.jar".to_string());

        let update = ParameterResolver::new(&egg, &meta, &submitted).server_edit_startup_parameters();
        assert_eq!(update.egg, 3);
        assert!(!update.skip_scripts);
        assert_eq!(
            update.environment.get("SERVER_JARFILE").map(String::as_str),
            Some("custom.jar")
        );
    }

    #[test]
    fn user_parameters_come_from_the_client_record() {
        let client = BillingClient {
            id: 42,
            email: "steve@example.com".to_string(),
            first_name: "Steve".to_string(),
            last_name: "Miner".to_string(),
        };
        let params = user_creation_parameters(&client);
        assert_eq!(params.username, "steve@example.com");
        assert_eq!(params.external_id, "42");
    }
}
