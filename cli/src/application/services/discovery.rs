//! Application service: tag-based workspace discovery.
//!
//! An investigation has no identifier beyond its `(cluster, investigation)`
//! key, so every lookup here is a tag-equality filter over what the storage
//! and compute ports return.

use tracing::debug;

use crate::application::ports::{ComputeClient, StorageClient};
use crate::domain::{
    AccessPoint, CloudError, InvestigationKey, LifecycleError, StatusFilter, Step, Task,
};

/// Resolve the single access point tagged with `key`.
///
/// # Errors
///
/// - [`LifecycleError::NotFound`] when nothing carries the tags.
/// - [`LifecycleError::Ambiguous`] when more than one access point does.
/// - [`LifecycleError::Cloud`] when the storage query fails.
pub async fn find_access_point(
    storage: &impl StorageClient,
    key: &InvestigationKey,
) -> Result<AccessPoint, LifecycleError> {
    let all = storage
        .list_access_points()
        .await
        .map_err(|e| LifecycleError::cloud(Step::Locate, key.to_string(), e))?;
    debug!(total = all.len(), %key, "listed access points");

    let mut matching: Vec<AccessPoint> =
        all.into_iter().filter(|ap| key.matches(&ap.tags)).collect();
    match matching.len() {
        0 => Err(LifecycleError::NotFound { key: key.clone() }),
        1 => Ok(matching.remove(0)),
        _ => Err(LifecycleError::Ambiguous {
            key: key.clone(),
            ids: matching.into_iter().map(|ap| ap.id).collect(),
        }),
    }
}

/// Tasks tagged with `key` whose status passes `filter`.
///
/// # Errors
///
/// Returns an error if the compute query fails.
pub async fn list_tasks(
    compute: &impl ComputeClient,
    key: &InvestigationKey,
    filter: &StatusFilter,
) -> Result<Vec<Task>, CloudError> {
    let tasks = list_cluster_tasks(compute, filter).await?;
    let tasks: Vec<Task> = tasks.into_iter().filter(|t| key.matches(&t.tags)).collect();
    debug!(count = tasks.len(), %key, ?filter, "matched investigation tasks");
    Ok(tasks)
}

/// Every task in the cluster whose status passes `filter`, regardless of tags.
///
/// # Errors
///
/// Returns an error if the compute query fails.
pub async fn list_cluster_tasks(
    compute: &impl ComputeClient,
    filter: &StatusFilter,
) -> Result<Vec<Task>, CloudError> {
    let tasks = compute.list_tasks(filter).await?;
    Ok(tasks.into_iter().filter(|t| filter.accepts(&t.status)).collect())
}

/// Task-definition revision ARNs of the family `family_prefix`. An empty
/// result is not an error.
///
/// The backend matches by prefix, so revisions of a longer family that merely
/// starts with `family_prefix` (investigation `a` vs `a-b`) are dropped.
///
/// # Errors
///
/// Returns an error if the compute query fails.
pub async fn list_task_definition_arns(
    compute: &impl ComputeClient,
    family_prefix: &str,
) -> Result<Vec<String>, CloudError> {
    let arns: Vec<String> = compute
        .list_task_definition_arns(family_prefix)
        .await?
        .into_iter()
        .filter(|arn| family_of(arn).is_none_or(|family| family == family_prefix))
        .collect();
    debug!(count = arns.len(), family_prefix, "listed task definitions");
    Ok(arns)
}

/// `arn:aws:ecs:…:task-definition/{family}:{revision}` → `family`.
fn family_of(arn: &str) -> Option<&str> {
    let (_, tail) = arn.split_once("task-definition/")?;
    Some(tail.rsplit_once(':').map_or(tail, |(family, _)| family))
}
