//! Tests for the `teardown` application service (`close_investigation`).
//!
//! Every test drives the orchestrator through in-memory ports and asserts on
//! both the outcome and the mutations that were (not) attempted.

#![allow(clippy::expect_used)]

use std::collections::HashSet;
use std::time::Duration;

use boundary_cli::application::services::teardown::{
    STOP_REASON, TeardownOptions, WaitOutcome, WaitPolicy, close_investigation, wait_for_terminal,
};
use boundary_cli::domain::{
    CloudError, ErrorKind, InvestigationKey, LifecycleError, Step, TaskStatus,
};
use tokio_util::sync::CancellationToken;

use crate::mocks::{
    MemoryCompute, MemoryStorage, RecordingReporter, ScriptedConfirmer, access_point, task,
    task_def_arn,
};

const CLUSTER: &str = "prod-1";
const INVESTIGATION: &str = "swift-dance-party";
const FAMILY: &str = "boundary-dev-prod-1-swift-dance-party";

fn key() -> InvestigationKey {
    InvestigationKey::new(CLUSTER, INVESTIGATION).expect("valid key")
}

fn opts(force: bool, skip_confirm: bool) -> TeardownOptions {
    TeardownOptions {
        cluster_name: "boundary-dev".to_string(),
        force,
        skip_confirm,
        wait: WaitPolicy {
            poll_interval: Duration::from_millis(5),
            timeout: Duration::from_millis(50),
        },
        cancel: CancellationToken::new(),
    }
}

fn storage_with_ap() -> MemoryStorage {
    MemoryStorage::with(vec![
        access_point("ap-123", CLUSTER, INVESTIGATION),
        access_point("ap-other", CLUSTER, "other-investigation"),
    ])
}

// ── Scenario A: no tasks, stale task definitions ─────────────────────────────

#[tokio::test]
async fn test_close_without_tasks_deregisters_and_deletes() {
    let storage = storage_with_ap();
    let compute = MemoryCompute::with(
        Vec::new(),
        vec![task_def_arn(FAMILY, 1), task_def_arn(FAMILY, 2)],
    );
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let summary = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(false, false),
    )
    .await
    .expect("teardown succeeds");

    assert_eq!(summary.access_point_id, "ap-123");
    assert_eq!(summary.access_point_path, "/prod-1/swift-dance-party");
    assert_eq!(summary.tasks_stopped, 0);
    assert_eq!(summary.task_defs_removed, 2);
    assert!(summary.warnings.is_empty());
    assert!(compute.stops().is_empty(), "no stop without running tasks");
    assert_eq!(storage.deletes(), vec!["ap-123"]);
    assert_eq!(confirmer.asked(), 1);
}

#[tokio::test]
async fn test_close_matches_non_slug_investigation_id() {
    let id = "INC_42";
    let family = format!("boundary-dev-{CLUSTER}-{id}");
    let storage = MemoryStorage::with(vec![
        access_point("ap-legacy", CLUSTER, id),
        access_point("ap-lower", CLUSTER, "inc_42"),
    ]);
    let compute = MemoryCompute::with(Vec::new(), vec![task_def_arn(&family, 1)]);
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();
    let key = InvestigationKey::new(CLUSTER, id).expect("existing ids are taken verbatim");

    let summary = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key,
        &opts(false, true),
    )
    .await
    .expect("teardown succeeds");

    assert_eq!(summary.access_point_id, "ap-legacy");
    assert_eq!(summary.task_defs_removed, 1);
    assert_eq!(storage.deletes(), vec!["ap-legacy"]);
}

#[tokio::test]
async fn test_deregister_failure_is_warning_and_not_counted() {
    let storage = storage_with_ap();
    let failing = task_def_arn(FAMILY, 1);
    let mut compute = MemoryCompute::with(
        Vec::new(),
        vec![failing.clone(), task_def_arn(FAMILY, 2)],
    );
    compute.deregister_failures = HashSet::from([failing.clone()]);
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let summary = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(false, false),
    )
    .await
    .expect("warnings do not abort teardown");

    assert_eq!(summary.task_defs_removed, 1);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].step, Step::Deregister);
    assert_eq!(summary.warnings[0].resource, failing);
    assert_eq!(storage.deletes(), vec!["ap-123"]);
    assert!(reporter.text().contains("warn: failed to deregister"));
}

#[tokio::test]
async fn test_listing_task_definitions_failure_is_warning() {
    let storage = storage_with_ap();
    let mut compute = MemoryCompute::default();
    compute.list_defs_error = Some(CloudError::api("ListTaskDefinitions", "throttled"));
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let summary = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(false, false),
    )
    .await
    .expect("listing failure is not fatal");

    assert_eq!(summary.task_defs_removed, 0);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].resource, FAMILY);
    assert_eq!(storage.deletes(), vec!["ap-123"]);
}

#[tokio::test]
async fn test_task_definitions_of_longer_family_are_left_alone() {
    let storage = storage_with_ap();
    let longer = task_def_arn(&format!("{FAMILY}-2"), 1);
    let compute = MemoryCompute::with(Vec::new(), vec![task_def_arn(FAMILY, 1), longer.clone()]);
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let summary = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(false, true),
    )
    .await
    .expect("teardown succeeds");

    assert_eq!(summary.task_defs_removed, 1);
    assert!(!compute.deregisters().contains(&longer));
}

// ── Scenario B: running task without --force ─────────────────────────────────

#[tokio::test]
async fn test_running_task_without_force_is_guarded() {
    let storage = storage_with_ap();
    let compute = MemoryCompute::with(
        vec![task("t-1", TaskStatus::Running, CLUSTER, INVESTIGATION)],
        vec![task_def_arn(FAMILY, 1)],
    );
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let err = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(false, true),
    )
    .await
    .expect_err("guard must refuse");

    assert_eq!(err.kind(), ErrorKind::Guarded);
    assert!(err.to_string().contains("t-1"), "got: {err}");
    assert_eq!(compute.mutation_count(), 0, "no stop, no deregister");
    assert!(storage.deletes().is_empty(), "no delete");
    assert_eq!(confirmer.asked(), 0);
}

#[tokio::test]
async fn test_tasks_of_other_investigations_do_not_trip_guard() {
    let storage = storage_with_ap();
    let compute = MemoryCompute::with(
        vec![
            task("t-9", TaskStatus::Running, CLUSTER, "other-investigation"),
            task("t-8", TaskStatus::Running, "prod-2", INVESTIGATION),
        ],
        Vec::new(),
    );
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let summary = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(false, true),
    )
    .await
    .expect("unrelated tasks are ignored");

    assert_eq!(summary.tasks_stopped, 0);
    assert!(compute.stops().is_empty());
}

// ── Forced teardown ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_force_stops_waits_and_deletes() {
    let storage = storage_with_ap();
    let compute = MemoryCompute::with(
        vec![
            task("t-1", TaskStatus::Running, CLUSTER, INVESTIGATION),
            task("t-2", TaskStatus::Running, CLUSTER, INVESTIGATION),
            task("t-old", TaskStatus::Stopped, CLUSTER, INVESTIGATION),
        ],
        vec![task_def_arn(FAMILY, 1)],
    );
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let summary = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(true, false),
    )
    .await
    .expect("forced teardown succeeds");

    assert_eq!(summary.tasks_stopped, 2);
    assert_eq!(summary.task_defs_removed, 1);
    assert!(summary.warnings.is_empty());
    assert_eq!(compute.stops(), vec!["t-1", "t-2"]);
    let reasons: Vec<String> = compute
        .stop_calls
        .lock()
        .expect("lock")
        .iter()
        .map(|(_, r)| r.clone())
        .collect();
    assert!(reasons.iter().all(|r| r == STOP_REASON));
    assert_eq!(storage.deletes(), vec!["ap-123"]);
}

#[tokio::test]
async fn test_wait_timeout_becomes_warning() {
    let storage = storage_with_ap();
    let mut compute = MemoryCompute::with(
        vec![task("t-1", TaskStatus::Running, CLUSTER, INVESTIGATION)],
        Vec::new(),
    );
    compute.sticky = HashSet::from(["t-1".to_string()]);
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let summary = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(true, true),
    )
    .await
    .expect("wait timeout is not fatal");

    assert_eq!(summary.tasks_stopped, 1);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].step, Step::Wait);
    assert_eq!(summary.warnings[0].resource, "t-1");
    assert!(summary.warnings[0].message.contains("STOPPING"));
    assert_eq!(storage.deletes(), vec!["ap-123"]);
}

#[tokio::test]
async fn test_stop_failure_is_fatal_and_nothing_deleted() {
    let storage = storage_with_ap();
    let mut compute = MemoryCompute::with(
        vec![task("t-1", TaskStatus::Running, CLUSTER, INVESTIGATION)],
        vec![task_def_arn(FAMILY, 1)],
    );
    compute.stop_error = Some(CloudError::api("StopTask", "AccessDeniedException"));
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let err = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(true, true),
    )
    .await
    .expect_err("stop failure aborts");

    assert_eq!(err.step(), Some(Step::Stop));
    assert_eq!(err.kind(), ErrorKind::Fatal);
    assert!(compute.deregisters().is_empty());
    assert!(storage.deletes().is_empty());
}

#[tokio::test]
async fn test_stop_of_vanished_task_is_not_counted() {
    let storage = storage_with_ap();
    let mut compute = MemoryCompute::with(
        vec![task("t-1", TaskStatus::Running, CLUSTER, INVESTIGATION)],
        Vec::new(),
    );
    compute.stop_error = Some(CloudError::not_found("task t-1"));
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let summary = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(true, true),
    )
    .await
    .expect("a task that is already gone is not an error");

    assert_eq!(summary.tasks_stopped, 0);
    assert_eq!(storage.deletes(), vec!["ap-123"]);
}

// ── Discovery failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_access_point_fails_before_any_mutation() {
    let storage = MemoryStorage::with(vec![access_point("ap-other", CLUSTER, "other")]);
    let compute = MemoryCompute::with(
        vec![task("t-1", TaskStatus::Running, CLUSTER, INVESTIGATION)],
        vec![task_def_arn(FAMILY, 1)],
    );
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let err = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(true, true),
    )
    .await
    .expect_err("nothing to close");

    assert!(matches!(err, LifecycleError::NotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(*compute.list_calls.lock().expect("lock"), 0);
    assert_eq!(compute.mutation_count(), 0);
    assert!(storage.deletes().is_empty());
}

#[tokio::test]
async fn test_duplicate_access_points_are_ambiguous() {
    let storage = MemoryStorage::with(vec![
        access_point("ap-1", CLUSTER, INVESTIGATION),
        access_point("ap-2", CLUSTER, INVESTIGATION),
    ]);
    let compute = MemoryCompute::default();
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let err = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(true, true),
    )
    .await
    .expect_err("refuses to pick one");

    assert_eq!(err.kind(), ErrorKind::Ambiguous);
    let msg = err.to_string();
    assert!(msg.contains("ap-1") && msg.contains("ap-2"), "got: {msg}");
    assert_eq!(compute.mutation_count(), 0);
    assert!(storage.deletes().is_empty());
}

#[tokio::test]
async fn test_inventory_failure_is_fatal() {
    let storage = storage_with_ap();
    let mut compute = MemoryCompute::default();
    compute.list_tasks_error = Some(CloudError::Timeout {
        operation: "ListTasks".into(),
    });
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    let err = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(true, true),
    )
    .await
    .expect_err("inventory failure aborts");

    assert_eq!(err.step(), Some(Step::Inventory));
    assert_eq!(err.kind(), ErrorKind::Transient);
    assert!(storage.deletes().is_empty());
}

// ── Confirmation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_declined_confirmation_aborts_without_delete() {
    let storage = storage_with_ap();
    let compute = MemoryCompute::with(Vec::new(), vec![task_def_arn(FAMILY, 1)]);
    let confirmer = ScriptedConfirmer::new(Some(false));
    let reporter = RecordingReporter::default();

    let err = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(false, false),
    )
    .await
    .expect_err("declined");

    assert!(matches!(err, LifecycleError::UserAborted));
    assert!(storage.deletes().is_empty());
    let prompts = confirmer.prompts.lock().expect("lock").clone();
    assert!(prompts[0].contains("ap-123"));
}

#[tokio::test]
async fn test_unreadable_confirmation_aborts() {
    let storage = storage_with_ap();
    let compute = MemoryCompute::default();
    let confirmer = ScriptedConfirmer::new(None);
    let reporter = RecordingReporter::default();

    let err = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(false, false),
    )
    .await
    .expect_err("no answer");

    assert_eq!(err.kind(), ErrorKind::UserAborted);
    assert!(storage.deletes().is_empty());
}

#[tokio::test]
async fn test_skip_confirm_never_prompts() {
    let storage = storage_with_ap();
    let compute = MemoryCompute::default();
    let confirmer = ScriptedConfirmer::new(Some(false));
    let reporter = RecordingReporter::default();

    close_investigation(&storage, &compute, &confirmer, &reporter, &key(), &opts(false, true))
        .await
        .expect("skip_confirm deletes without asking");

    assert_eq!(confirmer.asked(), 0);
    assert_eq!(storage.deletes(), vec!["ap-123"]);
}

// ── Idempotence ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_second_close_is_not_found() {
    let storage = storage_with_ap();
    let compute = MemoryCompute::default();
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();

    close_investigation(&storage, &compute, &confirmer, &reporter, &key(), &opts(false, true))
        .await
        .expect("first close succeeds");
    let err = close_investigation(
        &storage,
        &compute,
        &confirmer,
        &reporter,
        &key(),
        &opts(false, true),
    )
    .await
    .expect_err("second close finds nothing");

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(storage.deletes().len(), 1, "second run never reaches delete");
}

#[tokio::test]
async fn test_concurrent_delete_surfaces_not_found() {
    use boundary_cli::application::ports::StorageClient;

    let storage = storage_with_ap();
    storage
        .delete_access_point("ap-123")
        .await
        .expect("first delete succeeds");
    let err = storage
        .delete_access_point("ap-123")
        .await
        .expect_err("second delete fails");
    let err = LifecycleError::Cloud {
        step: Step::Delete,
        resource: "ap-123".into(),
        source: err,
    };
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ── Cancellation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cancelled_run_performs_no_calls() {
    let storage = storage_with_ap();
    let compute = MemoryCompute::default();
    let confirmer = ScriptedConfirmer::new(Some(true));
    let reporter = RecordingReporter::default();
    let options = opts(true, true);
    options.cancel.cancel();

    let err = close_investigation(&storage, &compute, &confirmer, &reporter, &key(), &options)
        .await
        .expect_err("cancelled");

    assert!(matches!(err, LifecycleError::Cancelled { step: Step::Locate }));
    assert_eq!(err.kind(), ErrorKind::UserAborted);
    assert!(storage.deletes().is_empty());
}

// ── Bounded wait ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_wait_returns_terminal_status() {
    let compute = MemoryCompute::with(
        vec![task("t-1", TaskStatus::Stopped, CLUSTER, INVESTIGATION)],
        Vec::new(),
    );
    let outcome =
        wait_for_terminal(&compute, "t-1", WaitPolicy::default(), &CancellationToken::new()).await;
    assert_eq!(outcome, WaitOutcome::Terminal(TaskStatus::Stopped));
}

#[tokio::test]
async fn test_wait_for_unknown_task_is_gone() {
    let compute = MemoryCompute::default();
    let outcome =
        wait_for_terminal(&compute, "t-404", WaitPolicy::default(), &CancellationToken::new())
            .await;
    assert_eq!(outcome, WaitOutcome::Gone);
}

#[tokio::test]
async fn test_wait_times_out_with_last_status() {
    let compute = MemoryCompute::with(
        vec![task("t-1", TaskStatus::Deprovisioning, CLUSTER, INVESTIGATION)],
        Vec::new(),
    );
    let policy = WaitPolicy {
        poll_interval: Duration::from_millis(10),
        timeout: Duration::from_millis(35),
    };
    let outcome = wait_for_terminal(&compute, "t-1", policy, &CancellationToken::new()).await;
    assert_eq!(
        outcome,
        WaitOutcome::TimedOut {
            last_status: Some(TaskStatus::Deprovisioning),
            last_error: None,
        }
    );
    let polls = *compute.describe_calls.lock().expect("lock");
    assert!((2..=6).contains(&polls), "bounded polling, got {polls}");
}

#[tokio::test]
async fn test_wait_observes_cancellation() {
    let compute = MemoryCompute::with(
        vec![task("t-1", TaskStatus::Running, CLUSTER, INVESTIGATION)],
        Vec::new(),
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });
    let policy = WaitPolicy {
        poll_interval: Duration::from_millis(5),
        timeout: Duration::from_secs(30),
    };
    let outcome = wait_for_terminal(&compute, "t-1", policy, &cancel).await;
    assert_eq!(outcome, WaitOutcome::Cancelled);
}

#[tokio::test]
async fn test_wait_gives_up_on_unanswered_describe() {
    let compute = MemoryCompute {
        describe_hangs: true,
        ..MemoryCompute::with(
            vec![task("t-1", TaskStatus::Stopping, CLUSTER, INVESTIGATION)],
            Vec::new(),
        )
    };
    let policy = WaitPolicy {
        poll_interval: Duration::from_millis(10),
        timeout: Duration::from_millis(100),
    };

    let outcome = tokio::time::timeout(
        Duration::from_secs(2),
        wait_for_terminal(&compute, "t-1", policy, &CancellationToken::new()),
    )
    .await
    .expect("wait is bounded by its own deadline");

    assert_eq!(
        outcome,
        WaitOutcome::TimedOut {
            last_status: None,
            last_error: None,
        }
    );
}

#[tokio::test]
async fn test_wait_cancellation_interrupts_pending_describe() {
    let compute = MemoryCompute {
        describe_hangs: true,
        ..MemoryCompute::default()
    };
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });
    let policy = WaitPolicy {
        poll_interval: Duration::from_millis(5),
        timeout: Duration::from_secs(30),
    };

    let outcome = tokio::time::timeout(
        Duration::from_secs(2),
        wait_for_terminal(&compute, "t-1", policy, &cancel),
    )
    .await
    .expect("cancellation is observed mid-call");

    assert_eq!(outcome, WaitOutcome::Cancelled);
}
