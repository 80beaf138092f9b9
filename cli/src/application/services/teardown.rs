//! Application service: close-investigation use-case.
//!
//! Removal order is strict: the access point is only deleted once no task
//! tagged with the investigation is running. Cleanup thoroughness is not:
//! wait timeouts and deregistration failures become warnings in the summary.
//!
//! Imports only from `crate::domain` and `crate::application`.

use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::ports::{ComputeClient, Confirmer, ProgressReporter, StorageClient};
use crate::application::services::discovery;
use crate::domain::{
    AccessPoint, CloudError, InvestigationKey, LifecycleError, StatusFilter, Step, Task,
    TaskStatus,
};

/// Reason attached to every stop request.
pub const STOP_REASON: &str = "Investigation closed via boundary close-investigation";

// ── Options and results ───────────────────────────────────────────────────────

/// Bounded poll used while a stopped task winds down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(6),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Per-invocation teardown settings.
#[derive(Debug, Clone)]
pub struct TeardownOptions {
    /// Compute cluster name, first segment of the task-definition family.
    pub cluster_name: String,
    /// Stop running tasks instead of refusing.
    pub force: bool,
    /// Delete without asking.
    pub skip_confirm: bool,
    pub wait: WaitPolicy,
    pub cancel: CancellationToken,
}

/// A non-fatal step failure kept for the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepWarning {
    pub step: Step,
    pub resource: String,
    pub message: String,
}

/// Outcome of one teardown step.
#[derive(Debug)]
pub enum StepResult<T> {
    Ok(T),
    Warning(T, Vec<StepWarning>),
    Fatal(LifecycleError),
}

impl<T> StepResult<T> {
    /// Unwrap the value, moving warnings into `warnings`; fatal outcomes
    /// become `Err` so the orchestrator can `?` them.
    fn record(self, warnings: &mut Vec<StepWarning>) -> Result<T, LifecycleError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Warning(value, mut step_warnings) => {
                warnings.append(&mut step_warnings);
                Ok(value)
            }
            Self::Fatal(err) => Err(err),
        }
    }
}

/// What happened to a closed investigation. Counts are derived from the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeardownSummary {
    pub cluster_id: String,
    pub investigation_id: String,
    pub access_point_id: String,
    pub access_point_path: String,
    pub tasks_stopped: usize,
    pub task_defs_removed: usize,
    pub warnings: Vec<StepWarning>,
}

/// Result of waiting for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Terminal(TaskStatus),
    /// The backend no longer knows the task.
    Gone,
    TimedOut {
        last_status: Option<TaskStatus>,
        last_error: Option<String>,
    },
    Cancelled,
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Close an investigation: stop its tasks, deregister its task definitions,
/// and delete its access point.
///
/// Filesystem data behind the access point is not touched.
///
/// # Errors
///
/// Returns the first fatal step failure. Nothing is deleted when locating,
/// the running-task guard, stopping, or confirmation fails.
pub async fn close_investigation(
    storage: &impl StorageClient,
    compute: &impl ComputeClient,
    confirmer: &impl Confirmer,
    reporter: &impl ProgressReporter,
    key: &InvestigationKey,
    opts: &TeardownOptions,
) -> Result<TeardownSummary, LifecycleError> {
    let mut warnings = Vec::new();

    // 1. Locate
    ensure_live(&opts.cancel, Step::Locate)?;
    reporter.step("Finding access point");
    reporter.info(&format!("Cluster:        {}", key.cluster_id));
    reporter.info(&format!("Investigation:  {}", key.investigation_id));
    let access_point = locate(storage, key).await.record(&mut warnings)?;
    reporter.info(&format!(
        "Found access point: {} (path: {})",
        access_point.id, access_point.path
    ));

    // 2. Inventory
    ensure_live(&opts.cancel, Step::Inventory)?;
    reporter.step("Checking for running tasks");
    let running = inventory(compute, key).await.record(&mut warnings)?;
    if running.is_empty() {
        reporter.info("No running tasks found");
    } else {
        reporter.info(&format!("Found {} running task(s):", running.len()));
        for task in &running {
            reporter.info(&format!("  {}", task.id));
        }
    }

    // 3. Guard
    guard(&running, opts.force).record(&mut warnings)?;

    // 4. Stop
    let mut tasks_stopped = 0;
    if !running.is_empty() {
        ensure_live(&opts.cancel, Step::Stop)?;
        reporter.info("Stopping running tasks (--force)...");
        let stopped = stop_tasks(compute, reporter, &running).await.record(&mut warnings)?;
        tasks_stopped = stopped.len();

        // 5. Wait
        ensure_live(&opts.cancel, Step::Wait)?;
        reporter.info("Waiting for tasks to stop...");
        wait_all(compute, reporter, &stopped, opts)
            .await
            .record(&mut warnings)?;
    }

    // 6. Deregister
    ensure_live(&opts.cancel, Step::Deregister)?;
    reporter.step("Deregistering task definitions");
    let family_prefix = key.task_definition_family(&opts.cluster_name);
    reporter.info(&format!("Family prefix: {family_prefix}"));
    let task_defs_removed = deregister_all(compute, reporter, &family_prefix)
        .await
        .record(&mut warnings)?;

    // 7. Confirm
    ensure_live(&opts.cancel, Step::Confirm)?;
    reporter.step("Deleting access point");
    reporter.info(&format!("Access Point: {}", access_point.id));
    reporter.info(&format!("Path:         {}", access_point.path));
    confirm(confirmer, &access_point, opts.skip_confirm).record(&mut warnings)?;

    // 8. Delete. Never interrupted once started.
    ensure_live(&opts.cancel, Step::Delete)?;
    delete(storage, &access_point).await.record(&mut warnings)?;
    reporter.success("Access point deleted");
    info!(
        %key,
        access_point_id = %access_point.id,
        tasks_stopped,
        task_defs_removed,
        "investigation closed"
    );

    Ok(TeardownSummary {
        cluster_id: key.cluster_id.clone(),
        investigation_id: key.investigation_id.clone(),
        access_point_id: access_point.id,
        access_point_path: access_point.path,
        tasks_stopped,
        task_defs_removed,
        warnings,
    })
}

// ── Steps ─────────────────────────────────────────────────────────────────────

fn ensure_live(cancel: &CancellationToken, next: Step) -> Result<(), LifecycleError> {
    if cancel.is_cancelled() {
        return Err(LifecycleError::Cancelled { step: next });
    }
    Ok(())
}

async fn locate(storage: &impl StorageClient, key: &InvestigationKey) -> StepResult<AccessPoint> {
    match discovery::find_access_point(storage, key).await {
        Ok(ap) => StepResult::Ok(ap),
        Err(e) => StepResult::Fatal(e),
    }
}

async fn inventory(compute: &impl ComputeClient, key: &InvestigationKey) -> StepResult<Vec<Task>> {
    let filter = StatusFilter::Only(TaskStatus::Running);
    match discovery::list_tasks(compute, key, &filter).await {
        Ok(tasks) => StepResult::Ok(tasks),
        Err(e) => StepResult::Fatal(LifecycleError::cloud(Step::Inventory, key.to_string(), e)),
    }
}

fn guard(running: &[Task], force: bool) -> StepResult<()> {
    if running.is_empty() || force {
        return StepResult::Ok(());
    }
    StepResult::Fatal(LifecycleError::Guarded {
        tasks: running.iter().map(|t| t.id.clone()).collect(),
    })
}

/// Request a stop for every task. Returns the ids whose stop was accepted.
async fn stop_tasks(
    compute: &impl ComputeClient,
    reporter: &impl ProgressReporter,
    running: &[Task],
) -> StepResult<Vec<String>> {
    let mut stopped = Vec::with_capacity(running.len());
    for task in running {
        match compute.stop_task(&task.id, STOP_REASON).await {
            Ok(()) => {
                reporter.info(&format!("  Stopped: {}", task.id));
                stopped.push(task.id.clone());
            }
            // Already gone, so nothing can still write to the workspace.
            Err(CloudError::NotFound { .. }) => {
                reporter.info(&format!("  Already gone: {}", task.id));
            }
            Err(e) => {
                return StepResult::Fatal(LifecycleError::cloud(Step::Stop, task.id.clone(), e));
            }
        }
    }
    StepResult::Ok(stopped)
}

async fn wait_all(
    compute: &impl ComputeClient,
    reporter: &impl ProgressReporter,
    task_ids: &[String],
    opts: &TeardownOptions,
) -> StepResult<()> {
    let mut warnings = Vec::new();
    for task_id in task_ids {
        match wait_for_terminal(compute, task_id, opts.wait, &opts.cancel).await {
            WaitOutcome::Terminal(_) | WaitOutcome::Gone => {
                debug!(task_id, "task reached a terminal status");
            }
            WaitOutcome::TimedOut {
                last_status,
                last_error,
            } => {
                let message = match (last_status, last_error) {
                    (_, Some(err)) => format!("may not have stopped cleanly: {err}"),
                    (Some(status), None) => {
                        format!("still {status} after {}s", opts.wait.timeout.as_secs())
                    }
                    (None, None) => "may not have stopped cleanly".to_string(),
                };
                warn!(task_id, %message, "task wait timed out");
                reporter.warn(&format!("task {task_id} {message}"));
                warnings.push(StepWarning {
                    step: Step::Wait,
                    resource: task_id.clone(),
                    message,
                });
            }
            WaitOutcome::Cancelled => {
                return StepResult::Fatal(LifecycleError::Cancelled { step: Step::Wait });
            }
        }
    }
    if warnings.is_empty() {
        StepResult::Ok(())
    } else {
        StepResult::Warning((), warnings)
    }
}

/// Poll `task_id` until it is terminal, gone, the deadline passes, or the run
/// is cancelled. Poll errors are retried until the deadline, and a poll still
/// in flight at the deadline is abandoned.
pub async fn wait_for_terminal(
    compute: &impl ComputeClient,
    task_id: &str,
    policy: WaitPolicy,
    cancel: &CancellationToken,
) -> WaitOutcome {
    let deadline = tokio::time::Instant::now() + policy.timeout;
    let mut last_status = None;
    let mut last_error = None;
    loop {
        let polled = tokio::select! {
            biased;
            () = cancel.cancelled() => return WaitOutcome::Cancelled,
            polled = tokio::time::timeout_at(deadline, compute.describe_task(task_id)) => polled,
        };
        let Ok(described) = polled else {
            debug!(task_id, "describe still pending at the deadline");
            return WaitOutcome::TimedOut {
                last_status,
                last_error,
            };
        };
        match described {
            Ok(Some(task)) if task.status.is_terminal() => {
                return WaitOutcome::Terminal(task.status);
            }
            Ok(Some(task)) => {
                debug!(task_id, status = %task.status, "task not yet stopped");
                last_status = Some(task.status);
                last_error = None;
            }
            Ok(None) => return WaitOutcome::Gone,
            Err(e) => {
                debug!(task_id, error = %e, "describe failed while waiting");
                last_error = Some(e.to_string());
            }
        }

        let now = tokio::time::Instant::now();
        if now >= deadline {
            return WaitOutcome::TimedOut {
                last_status,
                last_error,
            };
        }
        let nap = policy.poll_interval.min(deadline - now);
        tokio::select! {
            () = cancel.cancelled() => return WaitOutcome::Cancelled,
            () = tokio::time::sleep(nap) => {}
        }
    }
}

/// Deregister every revision under `family_prefix`; failures are warnings.
async fn deregister_all(
    compute: &impl ComputeClient,
    reporter: &impl ProgressReporter,
    family_prefix: &str,
) -> StepResult<usize> {
    let arns = match discovery::list_task_definition_arns(compute, family_prefix).await {
        Ok(arns) => arns,
        Err(e) => {
            warn!(family_prefix, error = %e, "cannot list task definitions");
            reporter.warn(&format!("cannot list task definitions: {e}"));
            return StepResult::Warning(
                0,
                vec![StepWarning {
                    step: Step::Deregister,
                    resource: family_prefix.to_string(),
                    message: e.to_string(),
                }],
            );
        }
    };

    if arns.is_empty() {
        reporter.info("No task definitions found (already deregistered or never created)");
        return StepResult::Ok(0);
    }

    reporter.info(&format!("Found {} task definition(s)", arns.len()));
    let mut removed = 0;
    let mut warnings = Vec::new();
    for arn in arns {
        match compute.deregister_task_definition(&arn).await {
            Ok(()) => {
                reporter.info(&format!("  Deregistered: {arn}"));
                removed += 1;
            }
            Err(e) => {
                warn!(%arn, error = %e, "deregistration failed");
                reporter.warn(&format!("failed to deregister {arn}: {e}"));
                warnings.push(StepWarning {
                    step: Step::Deregister,
                    resource: arn,
                    message: e.to_string(),
                });
            }
        }
    }

    if warnings.is_empty() {
        StepResult::Ok(removed)
    } else {
        StepResult::Warning(removed, warnings)
    }
}

fn confirm(
    confirmer: &impl Confirmer,
    access_point: &AccessPoint,
    skip_confirm: bool,
) -> StepResult<()> {
    if skip_confirm {
        return StepResult::Ok(());
    }
    let prompt = format!(
        "Delete access point {}? This cannot be undone.",
        access_point.id
    );
    match confirmer.confirm(&prompt) {
        Ok(true) => StepResult::Ok(()),
        Ok(false) => StepResult::Fatal(LifecycleError::UserAborted),
        Err(e) => {
            debug!(error = %e, "confirmation unreadable");
            StepResult::Fatal(LifecycleError::UserAborted)
        }
    }
}

async fn delete(storage: &impl StorageClient, access_point: &AccessPoint) -> StepResult<()> {
    match storage.delete_access_point(&access_point.id).await {
        Ok(()) => StepResult::Ok(()),
        Err(e) => StepResult::Fatal(LifecycleError::cloud(
            Step::Delete,
            access_point.id.clone(),
            e,
        )),
    }
}
