//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! Orchestrators return [`LifecycleError`]; everything converts to
//! `anyhow::Error` at the command boundary via `?`.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::domain::investigation::InvestigationKey;

// ── Error taxonomy ────────────────────────────────────────────────────────────

/// Coarse classification of every lifecycle failure, reported as the JSON
/// error `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Discovery found nothing where exactly one resource is required.
    NotFound,
    /// Discovery found more resources than the tagging invariant allows.
    Ambiguous,
    /// Disallowed without an explicit override flag.
    Guarded,
    /// The operator declined, gave no answer, or interrupted the run.
    UserAborted,
    /// A single external call timed out or could not connect.
    Transient,
    /// The creation endpoint answered with an error.
    RemoteRejected,
    Fatal,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Ambiguous => "ambiguous",
            Self::Guarded => "guarded",
            Self::UserAborted => "user_aborted",
            Self::Transient => "transient",
            Self::RemoteRejected => "remote_rejected",
            Self::Fatal => "fatal",
        }
    }
}

// ── Steps ─────────────────────────────────────────────────────────────────────

/// Orchestration step a failure or warning belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Locate,
    Inventory,
    Guard,
    Stop,
    Wait,
    Deregister,
    Confirm,
    Delete,
    ResolveId,
    Authenticate,
    Federate,
    Invoke,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Locate => "locate access point",
            Self::Inventory => "list running tasks",
            Self::Guard => "running task check",
            Self::Stop => "stop task",
            Self::Wait => "wait for task to stop",
            Self::Deregister => "deregister task definition",
            Self::Confirm => "confirmation",
            Self::Delete => "delete access point",
            Self::ResolveId => "resolve investigation id",
            Self::Authenticate => "authentication",
            Self::Federate => "invoker role assumption",
            Self::Invoke => "create investigation",
        })
    }
}

// ── Investigation errors ──────────────────────────────────────────────────────

/// Errors related to investigation identity.
#[derive(Debug, Error)]
pub enum InvestigationError {
    #[error("Cluster ID must not be empty.")]
    EmptyClusterId,

    #[error("Investigation ID must not be empty.")]
    EmptyInvestigationId,

    #[error("Invalid investigation ID '{id}': {reason}")]
    InvalidId { id: String, reason: String },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("{key} is required; set {hint}")]
    Missing { key: &'static str, hint: String },

    #[error("Invalid value for {key}: {value} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

// ── Cloud port errors ─────────────────────────────────────────────────────────

/// Failure reported by a storage, compute, or federation adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CloudError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("{operation} timed out")]
    Timeout { operation: String },

    #[error("{operation} failed: {message}")]
    Api { operation: String, message: String },
}

impl CloudError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn api(operation: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Api {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

// ── Creation endpoint errors ──────────────────────────────────────────────────

/// Failure talking to the create-investigation endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("no response within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("credentials rejected (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Structured `{error}` body from a non-200 response.
    #[error("endpoint returned {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Non-200 response without a structured error body.
    #[error("endpoint returned HTTP {status}: {body}")]
    Unstructured { status: u16, body: String },

    #[error("response missing {0}")]
    MissingField(&'static str),

    #[error("cannot decode response: {0}")]
    Decode(String),

    #[error("cannot encode request: {0}")]
    Encode(String),
}

// ── Lifecycle errors ──────────────────────────────────────────────────────────

/// Fatal outcome of a provisioning or teardown run.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("no access point found for cluster {:?} investigation {:?}", .key.cluster_id, .key.investigation_id)]
    NotFound { key: InvestigationKey },

    #[error(
        "{} access points are tagged for cluster {:?} investigation {:?} ({}); refusing to pick one",
        .ids.len(), .key.cluster_id, .key.investigation_id, .ids.join(", ")
    )]
    Ambiguous { key: InvestigationKey, ids: Vec<String> },

    #[error("{} task(s) are still running ({}); use --force to stop them first", .tasks.len(), .tasks.join(", "))]
    Guarded { tasks: Vec<String> },

    #[error("aborted")]
    UserAborted,

    #[error("cancelled before {step}")]
    Cancelled { step: Step },

    #[error("{step} failed for {resource}: {source}")]
    Cloud {
        step: Step,
        resource: String,
        source: CloudError,
    },

    #[error("{step} failed: {source}")]
    Gateway { step: Step, source: GatewayError },

    #[error("{step} failed: {source:#}")]
    Auth {
        step: Step,
        source: anyhow::Error,
    },

    #[error(transparent)]
    Investigation(#[from] InvestigationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LifecycleError {
    pub(crate) fn cloud(step: Step, resource: impl Into<String>, source: CloudError) -> Self {
        Self::Cloud {
            step,
            resource: resource.into(),
            source,
        }
    }

    /// Taxonomy bucket for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Ambiguous { .. } => ErrorKind::Ambiguous,
            Self::Guarded { .. } => ErrorKind::Guarded,
            Self::UserAborted | Self::Cancelled { .. } => ErrorKind::UserAborted,
            Self::Cloud { source, .. } => match source {
                CloudError::NotFound { .. } => ErrorKind::NotFound,
                CloudError::Timeout { .. } => ErrorKind::Transient,
                CloudError::Api { .. } => ErrorKind::Fatal,
            },
            Self::Gateway { source, .. } => match source {
                GatewayError::Timeout(_) | GatewayError::Transport(_) => ErrorKind::Transient,
                GatewayError::Unauthorized { .. }
                | GatewayError::Rejected { .. }
                | GatewayError::Unstructured { .. } => ErrorKind::RemoteRejected,
                GatewayError::MissingField(_)
                | GatewayError::Decode(_)
                | GatewayError::Encode(_) => ErrorKind::Fatal,
            },
            Self::Auth { .. } | Self::Investigation(_) | Self::Config(_) => ErrorKind::Fatal,
        }
    }

    /// Step the run failed in, when the error is tied to one.
    #[must_use]
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::NotFound { .. } | Self::Ambiguous { .. } => Some(Step::Locate),
            Self::Guarded { .. } => Some(Step::Guard),
            Self::UserAborted => Some(Step::Confirm),
            Self::Cancelled { step }
            | Self::Cloud { step, .. }
            | Self::Gateway { step, .. }
            | Self::Auth { step, .. } => Some(*step),
            Self::Investigation(_) => Some(Step::ResolveId),
            Self::Config(_) => None,
        }
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
