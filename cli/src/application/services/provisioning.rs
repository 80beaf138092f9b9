//! Application service: create-investigation use-case.
//!
//! Every step is fatal: an investigation either ends with an access point id
//! reported back, or with an error naming the step that failed.
//!
//! Imports only from `crate::domain` and `crate::application`.

use boundary_common::InvestigationRequest;
use rand::Rng;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::application::ports::{
    Authenticator, CredentialFederation, EndpointTransport, ProgressReporter,
};
use crate::application::services::gateway::LambdaGateway;
use crate::domain::{
    InvestigationKey, LifecycleError, PkceConfig, Step, generate_investigation_id,
};

/// Session name used when assuming the invoker role.
pub const INVOKER_SESSION_NAME: &str = "boundary-invoker";

/// Task launch settings for full provisioning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskLaunch {
    pub oc_version: Option<String>,
    /// Seconds before the endpoint's reaper stops the task.
    pub task_timeout: Option<u64>,
}

/// Per-invocation provisioning settings. Configuration has already been
/// resolved, so nothing here can be missing once authentication starts.
#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    pub cluster_id: String,
    /// Caller-supplied id; a three-word id is generated when absent.
    pub investigation_id: Option<String>,
    pub force_login: bool,
    pub pkce: PkceConfig,
    pub region: String,
    pub invoker_role_arn: String,
    /// `None` creates the access point only.
    pub start_task: Option<TaskLaunch>,
    pub cancel: CancellationToken,
}

/// What a successful run created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionSummary {
    pub cluster_id: String,
    pub investigation_id: String,
    /// True when the id was generated rather than supplied.
    pub id_generated: bool,
    pub access_point_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Validate the caller's id or generate one. Returns the key and whether the
/// id was generated.
///
/// Generated ids are not checked for collisions; a clash surfaces as the
/// endpoint's own error.
///
/// # Errors
///
/// Returns an error if the cluster id is empty or a supplied id is invalid.
pub fn resolve_key(
    cluster_id: &str,
    requested: Option<&str>,
    rng: &mut impl Rng,
) -> Result<(InvestigationKey, bool), LifecycleError> {
    match requested.filter(|id| !id.is_empty()) {
        Some(id) => Ok((InvestigationKey::for_creation(cluster_id, id)?, false)),
        None => {
            let generated = generate_investigation_id(rng);
            debug!(investigation_id = %generated, "generated investigation id");
            Ok((InvestigationKey::for_creation(cluster_id, generated)?, true))
        }
    }
}

/// Create an investigation workspace through the remote creation endpoint.
///
/// # Errors
///
/// Returns the first failing step: id resolution, authentication, role
/// assumption, or the endpoint call.
pub async fn create_investigation<T: EndpointTransport>(
    auth: &impl Authenticator,
    federation: &impl CredentialFederation,
    gateway: &LambdaGateway<T>,
    reporter: &impl ProgressReporter,
    opts: &ProvisionOptions,
    rng: &mut impl Rng,
) -> Result<ProvisionSummary, LifecycleError> {
    // 1. Resolve id
    let (key, id_generated) = resolve_key(&opts.cluster_id, opts.investigation_id.as_deref(), rng)?;
    reporter.info(&format!("Cluster:        {}", key.cluster_id));
    if id_generated {
        reporter.info(&format!("Investigation:  {} (generated)", key.investigation_id));
    } else {
        reporter.info(&format!("Investigation:  {}", key.investigation_id));
    }

    // 2. Authenticate
    ensure_live(&opts.cancel, Step::Authenticate)?;
    reporter.step("Authenticating");
    let token = auth
        .identity_token(&opts.pkce, opts.force_login)
        .await
        .map_err(|source| LifecycleError::Auth {
            step: Step::Authenticate,
            source,
        })?;

    // 3. Federate
    ensure_live(&opts.cancel, Step::Federate)?;
    reporter.step("Assuming invoker role");
    reporter.info(&format!("Role: {}", opts.invoker_role_arn));
    let credential = federation
        .assume_role_with_identity(
            &opts.region,
            &opts.invoker_role_arn,
            &token,
            INVOKER_SESSION_NAME,
        )
        .await
        .map_err(|e| LifecycleError::cloud(Step::Federate, opts.invoker_role_arn.clone(), e))?;
    debug!(expires_at = %credential.expires_at, "invoker credentials issued");

    // 4. Invoke
    ensure_live(&opts.cancel, Step::Invoke)?;
    reporter.step("Creating investigation");
    let request = build_request(&key, opts.start_task.as_ref());
    let created = gateway
        .invoke(&credential, &token, &request)
        .await
        .map_err(|source| LifecycleError::Gateway {
            step: Step::Invoke,
            source,
        })?;

    // 5. Report
    reporter.success(&format!("Access point created: {}", created.access_point_id));
    if let Some(task_arn) = &created.task_arn {
        reporter.info(&format!("Task: {task_arn}"));
    }
    info!(%key, access_point_id = %created.access_point_id, "investigation created");

    Ok(ProvisionSummary {
        cluster_id: key.cluster_id,
        investigation_id: key.investigation_id,
        id_generated,
        access_point_id: created.access_point_id,
        task_arn: created.task_arn,
        owner: created.owner,
        role_arn: created.role_arn,
        message: created.message,
    })
}

fn build_request(key: &InvestigationKey, launch: Option<&TaskLaunch>) -> InvestigationRequest {
    match launch {
        None => InvestigationRequest::workspace_only(&key.cluster_id, &key.investigation_id),
        Some(launch) => InvestigationRequest {
            oc_version: launch.oc_version.clone(),
            task_timeout: launch.task_timeout,
            ..InvestigationRequest::new(&key.cluster_id, &key.investigation_id)
        },
    }
}

fn ensure_live(cancel: &CancellationToken, next: Step) -> Result<(), LifecycleError> {
    if cancel.is_cancelled() {
        return Err(LifecycleError::Cancelled { step: next });
    }
    Ok(())
}
