//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;

use anyhow::Result;

use crate::domain::{
    AccessPoint, BoundaryConfig, CloudError, Credential, GatewayError, IdentityToken, PkceConfig,
    StatusFilter, Task,
};

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the stored configuration, defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<BoundaryConfig>;

    /// Persist the configuration with owner-only permissions.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &BoundaryConfig) -> Result<()>;

    /// Path of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if no location can be determined.
    fn path(&self) -> Result<PathBuf>;
}

// ── Storage Port ──────────────────────────────────────────────────────────────

/// Access points of one filesystem in one region.
#[allow(async_fn_in_trait)]
pub trait StorageClient {
    /// Every access point of the filesystem, with its tags.
    async fn list_access_points(&self) -> Result<Vec<AccessPoint>, CloudError>;
    /// Delete an access point. Deleting an absent one returns
    /// [`CloudError::NotFound`].
    async fn delete_access_point(&self, access_point_id: &str) -> Result<(), CloudError>;
}

// ── Compute Port ──────────────────────────────────────────────────────────────

/// Tasks and task definitions of one cluster in one region.
#[allow(async_fn_in_trait)]
pub trait ComputeClient {
    /// Tasks in the cluster with their tags, narrowed by `filter` where the
    /// backend supports it. Callers still apply the filter exactly.
    async fn list_tasks(&self, filter: &StatusFilter) -> Result<Vec<Task>, CloudError>;
    /// Current state of one task, `None` once the backend has forgotten it.
    async fn describe_task(&self, task_id: &str) -> Result<Option<Task>, CloudError>;
    /// Request a stop. Returns as soon as the request is accepted.
    async fn stop_task(&self, task_id: &str, reason: &str) -> Result<(), CloudError>;
    /// Active task-definition revision ARNs whose family starts with `family_prefix`.
    async fn list_task_definition_arns(&self, family_prefix: &str)
    -> Result<Vec<String>, CloudError>;
    /// Deregister one revision.
    async fn deregister_task_definition(&self, arn: &str) -> Result<(), CloudError>;
}

// ── Identity Ports ────────────────────────────────────────────────────────────

/// Produces an identity token for the operator.
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    /// Return a valid identity token. `force_fresh` bypasses any cache.
    async fn identity_token(&self, pkce: &PkceConfig, force_fresh: bool)
    -> Result<IdentityToken>;
}

/// Exchanges an identity token for short-lived role credentials.
#[allow(async_fn_in_trait)]
pub trait CredentialFederation {
    async fn assume_role_with_identity(
        &self,
        region: &str,
        role_arn: &str,
        token: &IdentityToken,
        session_name: &str,
    ) -> Result<Credential, CloudError>;
}

// ── Creation Endpoint Port ────────────────────────────────────────────────────

/// Raw status and body returned by the creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    pub status: u16,
    pub body: String,
}

/// Delivers one JSON body to the create-investigation endpoint.
///
/// Implementations only move bytes; classification of the response belongs
/// to `services::gateway`.
#[allow(async_fn_in_trait)]
pub trait EndpointTransport {
    /// POST `body` with `Authorization: Bearer <bearer>`. `credential` is the
    /// federated invoker credential for transports that sign at the
    /// transport level.
    async fn post(
        &self,
        credential: &Credential,
        bearer: &IdentityToken,
        body: Vec<u8>,
    ) -> Result<EndpointResponse, GatewayError>;
}

// ── Interaction Ports ─────────────────────────────────────────────────────────

/// Asks the operator a yes/no question.
pub trait Confirmer {
    /// `Ok(true)` only for an explicit affirmative answer.
    ///
    /// # Errors
    ///
    /// Returns an error if no answer could be read.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit a section header for a new step.
    fn step(&self, message: &str);
    /// Emit a detail line within the current step.
    fn info(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
