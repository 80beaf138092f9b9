//! Domain types and validators for boundary configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access. Loading and
//! environment lookup live in `crate::infra::config`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::credential::PkceConfig;
use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Every settable key, in the order `configure` prompts for them.
pub const CONFIG_KEYS: &[&str] = &[
    "keycloak_url",
    "keycloak_realm",
    "oidc_client_id",
    "lambda_function_name",
    "lambda_url",
    "invoker_role_arn",
    "aws_region",
    "cluster_name",
    "efs_filesystem_id",
    "poll_interval_secs",
    "task_stop_timeout_secs",
];

/// Prefix for environment overrides, e.g. `BOUNDARY_AWS_REGION`.
pub const ENV_PREFIX: &str = "BOUNDARY_";

// ── Config schema ────────────────────────────────────────────────────────────

/// Configuration stored in `~/.config/boundary/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BoundaryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keycloak_url: Option<String>,
    pub keycloak_realm: String,
    pub oidc_client_id: String,
    /// Name of the create-investigation function, invoked with federated
    /// credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda_function_name: Option<String>,
    /// Function URL of the create-investigation endpoint, used when no
    /// function name is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoker_role_arn: Option<String>,
    pub aws_region: String,
    /// ECS cluster hosting investigation tasks.
    pub cluster_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efs_filesystem_id: Option<String>,
    pub poll_interval_secs: u64,
    pub task_stop_timeout_secs: u64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            keycloak_url: None,
            keycloak_realm: "sre-ops".to_string(),
            oidc_client_id: "aws-sre-access".to_string(),
            lambda_function_name: None,
            lambda_url: None,
            invoker_role_arn: None,
            aws_region: "us-east-2".to_string(),
            cluster_name: "boundary-dev".to_string(),
            efs_filesystem_id: None,
            poll_interval_secs: 6,
            task_stop_timeout_secs: 600,
        }
    }
}

/// Where the create-investigation endpoint lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointTarget {
    FunctionName(String),
    FunctionUrl(String),
}

impl BoundaryConfig {
    /// Current value of `key` rendered as a string, `None` when unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "keycloak_url" => self.keycloak_url.clone(),
            "keycloak_realm" => Some(self.keycloak_realm.clone()),
            "oidc_client_id" => Some(self.oidc_client_id.clone()),
            "lambda_function_name" => self.lambda_function_name.clone(),
            "lambda_url" => self.lambda_url.clone(),
            "invoker_role_arn" => self.invoker_role_arn.clone(),
            "aws_region" => Some(self.aws_region.clone()),
            "cluster_name" => Some(self.cluster_name.clone()),
            "efs_filesystem_id" => self.efs_filesystem_id.clone(),
            "poll_interval_secs" => Some(self.poll_interval_secs.to_string()),
            "task_stop_timeout_secs" => Some(self.task_stop_timeout_secs.to_string()),
            _ => None,
        }
    }

    /// Set `key` from its string form. Blank values clear optional keys.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys or values that fail validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
        match key {
            "keycloak_url" => {
                if !value.is_empty() && !value.starts_with("http") {
                    return Err(invalid("keycloak_url", value, "must be an http(s) URL"));
                }
                self.keycloak_url = optional(value);
            }
            "keycloak_realm" => self.keycloak_realm = required("keycloak_realm", value)?,
            "oidc_client_id" => self.oidc_client_id = required("oidc_client_id", value)?,
            "lambda_function_name" => self.lambda_function_name = optional(value),
            "lambda_url" => {
                if !value.is_empty() && !value.starts_with("https://") {
                    return Err(invalid("lambda_url", value, "must be an https:// URL"));
                }
                self.lambda_url = optional(value);
            }
            "invoker_role_arn" => {
                if !value.is_empty() && !value.starts_with("arn:") {
                    return Err(invalid("invoker_role_arn", value, "must be an IAM role ARN"));
                }
                self.invoker_role_arn = optional(value);
            }
            "aws_region" => self.aws_region = required("aws_region", value)?,
            "cluster_name" => self.cluster_name = required("cluster_name", value)?,
            "efs_filesystem_id" => self.efs_filesystem_id = optional(value),
            "poll_interval_secs" => {
                self.poll_interval_secs = positive_secs("poll_interval_secs", value)?;
            }
            "task_stop_timeout_secs" => {
                self.task_stop_timeout_secs = positive_secs("task_stop_timeout_secs", value)?;
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                    valid: CONFIG_KEYS.join(", "),
                });
            }
        }
        Ok(())
    }

    /// Apply `BOUNDARY_<KEY>` overrides produced by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override value fails validation.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        for key in CONFIG_KEYS {
            if let Some(value) = lookup(&env_var_name(key)) {
                self.set(key, &value)?;
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if `keycloak_url` is unset.
    pub fn pkce(&self) -> Result<PkceConfig, ConfigError> {
        let keycloak_url = self
            .keycloak_url
            .clone()
            .ok_or_else(|| missing("keycloak_url"))?;
        Ok(PkceConfig {
            keycloak_url,
            realm: self.keycloak_realm.clone(),
            client_id: self.oidc_client_id.clone(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if `invoker_role_arn` is unset.
    pub fn invoker_role_arn(&self) -> Result<&str, ConfigError> {
        self.invoker_role_arn
            .as_deref()
            .ok_or_else(|| missing("invoker_role_arn"))
    }

    /// The function name wins when both a name and a URL are configured.
    ///
    /// # Errors
    ///
    /// Returns an error if neither is configured.
    pub fn endpoint(&self) -> Result<EndpointTarget, ConfigError> {
        if let Some(name) = &self.lambda_function_name {
            return Ok(EndpointTarget::FunctionName(name.clone()));
        }
        if let Some(url) = &self.lambda_url {
            return Ok(EndpointTarget::FunctionUrl(url.clone()));
        }
        Err(missing("lambda_function_name"))
    }

    /// # Errors
    ///
    /// Returns an error if `efs_filesystem_id` is unset.
    pub fn efs_filesystem_id(&self) -> Result<&str, ConfigError> {
        self.efs_filesystem_id
            .as_deref()
            .ok_or_else(|| missing("efs_filesystem_id"))
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn task_stop_timeout(&self) -> Duration {
        Duration::from_secs(self.task_stop_timeout_secs)
    }
}

/// `aws_region` → `BOUNDARY_AWS_REGION`.
#[must_use]
pub fn env_var_name(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.to_ascii_uppercase())
}

fn missing(key: &'static str) -> ConfigError {
    ConfigError::Missing {
        key,
        hint: format!(
            "{} or {key} in the config file (run 'boundary configure')",
            env_var_name(key)
        ),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn required(key: &'static str, value: &str) -> Result<String, ConfigError> {
    if value.is_empty() {
        return Err(invalid(key, value, "must not be empty"));
    }
    Ok(value.to_string())
}

fn positive_secs(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(0) => Err(invalid(key, value, "must be greater than zero")),
        Ok(secs) => Ok(secs),
        Err(_) => Err(invalid(key, value, "must be a whole number of seconds")),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
