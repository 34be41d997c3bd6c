//! Configuration: `neutron-bench.toml` parsing and runtime settings.
//!
//! [`BenchConfig`] holds the logging settings and the OpenStack deployment
//! the scenarios run against.
//!
//! # Load order
//! 1. CLI flags (highest)
//! 2. Environment variables (`NEUTRON_BENCH_OPENSTACK_AUTH_URL=...`)
//! 3. Config file (`neutron-bench.toml`)
//! 4. Defaults (`Default` impls)
//!
//! # Example
//! ```no_run
//! # async fn example() -> Result<(), neutron_bench_core::error::BenchError> {
//! use neutron_bench_core::config::BenchConfig;
//!
//! let config = BenchConfig::load("neutron-bench.toml").await?;
//! let config = BenchConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BenchError, ConfigError};

/// Valid values for `general.log_level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Valid values for `openstack.endpoint_type`.
pub const ENDPOINT_TYPES: [&str; 3] = ["public", "internal", "admin"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Logging settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Target deployment
    #[serde(default)]
    pub openstack: OpenStackConfig,
}

impl BenchConfig {
    /// Loads the file, applies environment overrides and validates.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, BenchError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads the file without environment overrides.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, BenchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BenchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                BenchError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, BenchError> {
        toml::from_str(toml_str).map_err(|e| {
            BenchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// Overrides values from the environment.
    ///
    /// Naming: `NEUTRON_BENCH_{SECTION}_{FIELD}`, admin credentials use
    /// `NEUTRON_BENCH_OPENSTACK_ADMIN_{FIELD}`.
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.general.log_level, "NEUTRON_BENCH_GENERAL_LOG_LEVEL");
        override_string(
            &mut self.general.log_format,
            "NEUTRON_BENCH_GENERAL_LOG_FORMAT",
        );

        let os = &mut self.openstack;
        override_string(&mut os.auth_url, "NEUTRON_BENCH_OPENSTACK_AUTH_URL");
        override_string(&mut os.region_name, "NEUTRON_BENCH_OPENSTACK_REGION_NAME");
        override_string(
            &mut os.endpoint_type,
            "NEUTRON_BENCH_OPENSTACK_ENDPOINT_TYPE",
        );
        override_string(
            &mut os.network_endpoint,
            "NEUTRON_BENCH_OPENSTACK_NETWORK_ENDPOINT",
        );
        override_bool(&mut os.https_insecure, "NEUTRON_BENCH_OPENSTACK_HTTPS_INSECURE");
        override_u64(
            &mut os.request_timeout_secs,
            "NEUTRON_BENCH_OPENSTACK_REQUEST_TIMEOUT_SECS",
        );

        let admin = os.admin.get_or_insert_with(CredentialConfig::default);
        override_string(&mut admin.username, "NEUTRON_BENCH_OPENSTACK_ADMIN_USERNAME");
        override_string(&mut admin.password, "NEUTRON_BENCH_OPENSTACK_ADMIN_PASSWORD");
        override_string(
            &mut admin.project_name,
            "NEUTRON_BENCH_OPENSTACK_ADMIN_PROJECT_NAME",
        );
        if admin.username.is_empty() {
            os.admin = None;
        }
    }

    /// Validates field values.
    pub fn validate(&self) -> Result<(), BenchError> {
        if !LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", LOG_LEVELS.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        let os = &self.openstack;
        if !ENDPOINT_TYPES.contains(&os.endpoint_type.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "openstack.endpoint_type".to_owned(),
                reason: format!("must be one of: {}", ENDPOINT_TYPES.join(", ")),
            }
            .into());
        }

        if os.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "openstack.request_timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        for (field, url) in [
            ("openstack.auth_url", &os.auth_url),
            ("openstack.network_endpoint", &os.network_endpoint),
        ] {
            if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "must start with http:// or https://".to_owned(),
                }
                .into());
            }
        }

        if let Some(admin) = &os.admin {
            admin.validate("openstack.admin")?;
        }
        for (idx, user) in os.users.iter().enumerate() {
            user.validate(&format!("openstack.users[{idx}]"))?;
        }

        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log format (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// OpenStack deployment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenStackConfig {
    /// Keystone v3 endpoint, e.g. `https://keystone:5000/v3`
    pub auth_url: String,
    /// Region filter for catalog lookups (empty matches any region)
    pub region_name: String,
    /// Catalog interface (public, internal, admin)
    pub endpoint_type: String,
    /// Neutron endpoint override; skips the catalog when set
    pub network_endpoint: String,
    /// Skip TLS certificate verification
    pub https_insecure: bool,
    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Admin credentials
    pub admin: Option<CredentialConfig>,
    /// Tenant users, used round-robin across iterations
    pub users: Vec<CredentialConfig>,
}

impl Default for OpenStackConfig {
    fn default() -> Self {
        Self {
            auth_url: String::new(),
            region_name: String::new(),
            endpoint_type: "public".to_owned(),
            network_endpoint: String::new(),
            https_insecure: false,
            request_timeout_secs: 60,
            admin: None,
            users: Vec::new(),
        }
    }
}

/// Keystone password credentials scoped to a project.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    pub username: String,
    pub password: String,
    pub project_name: String,
    pub user_domain_name: String,
    pub project_domain_name: String,
}

impl CredentialConfig {
    fn validate(&self, field: &str) -> Result<(), BenchError> {
        for (name, value) in [("username", &self.username), ("project_name", &self.project_name)] {
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("{field}.{name}"),
                    reason: "must not be empty".to_owned(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Copy with the password replaced, for display.
    pub fn redacted(&self) -> Self {
        Self {
            password: if self.password.is_empty() {
                String::new()
            } else {
                "***REDACTED***".to_owned()
            },
            ..self.clone()
        }
    }
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            project_name: String::new(),
            user_domain_name: "Default".to_owned(),
            project_domain_name: "Default".to_owned(),
        }
    }
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("project_name", &self.project_name)
            .field("user_domain_name", &self.user_domain_name)
            .field("project_domain_name", &self.project_domain_name)
            .finish()
    }
}

// --- env override helpers ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
