//! Tests for the `discovery` application service.

#![allow(clippy::expect_used)]

use boundary_cli::application::services::discovery::{
    find_access_point, list_cluster_tasks, list_task_definition_arns, list_tasks,
};
use boundary_cli::domain::{
    CloudError, ErrorKind, InvestigationKey, LifecycleError, StatusFilter, Step, TaskStatus,
};

use crate::mocks::{MemoryCompute, MemoryStorage, access_point, task, task_def_arn};

fn key(investigation_id: &str) -> InvestigationKey {
    InvestigationKey::new("prod-1", investigation_id).expect("valid key")
}

#[tokio::test]
async fn test_find_access_point_requires_both_tags() {
    let storage = MemoryStorage::with(vec![
        access_point("ap-1", "prod-2", "inv-a"),
        access_point("ap-2", "prod-1", "inv-b"),
        access_point("ap-3", "prod-1", "inv-a"),
    ]);

    let ap = find_access_point(&storage, &key("inv-a"))
        .await
        .expect("exactly one match");

    assert_eq!(ap.id, "ap-3");
}

#[tokio::test]
async fn test_find_access_point_ignores_untagged() {
    let mut untagged = access_point("ap-0", "prod-1", "inv-a");
    untagged.tags.clear();
    let storage = MemoryStorage::with(vec![untagged]);

    let err = find_access_point(&storage, &key("inv-a"))
        .await
        .expect_err("untagged access points never match");

    assert!(matches!(err, LifecycleError::NotFound { .. }));
}

#[tokio::test]
async fn test_find_access_point_propagates_storage_failure() {
    let storage = MemoryStorage {
        list_error: Some(CloudError::Timeout {
            operation: "DescribeAccessPoints".into(),
        }),
        ..MemoryStorage::default()
    };

    let err = find_access_point(&storage, &key("inv-a"))
        .await
        .expect_err("storage failure");

    assert_eq!(err.step(), Some(Step::Locate));
    assert_eq!(err.kind(), ErrorKind::Transient);
}

#[tokio::test]
async fn test_find_access_point_lists_every_duplicate() {
    let storage = MemoryStorage::with(vec![
        access_point("ap-1", "prod-1", "inv-a"),
        access_point("ap-2", "prod-1", "inv-a"),
        access_point("ap-3", "prod-1", "inv-a"),
    ]);

    let err = find_access_point(&storage, &key("inv-a"))
        .await
        .expect_err("ambiguous");

    match err {
        LifecycleError::Ambiguous { ids, .. } => assert_eq!(ids, vec!["ap-1", "ap-2", "ap-3"]),
        other => panic!("expected Ambiguous, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_tasks_filters_status_exactly() {
    let compute = MemoryCompute::with(
        vec![
            task("t-run", TaskStatus::Running, "prod-1", "inv-a"),
            task("t-pend", TaskStatus::Pending, "prod-1", "inv-a"),
            task("t-stop", TaskStatus::Stopped, "prod-1", "inv-a"),
        ],
        Vec::new(),
    );

    let running = list_tasks(&compute, &key("inv-a"), &StatusFilter::Only(TaskStatus::Running))
        .await
        .expect("listing succeeds");

    let ids: Vec<&str> = running.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t-run"]);
}

#[tokio::test]
async fn test_list_tasks_matches_investigation_tags() {
    let compute = MemoryCompute::with(
        vec![
            task("t-1", TaskStatus::Running, "prod-1", "inv-a"),
            task("t-2", TaskStatus::Running, "prod-1", "inv-b"),
            task("t-3", TaskStatus::Running, "prod-2", "inv-a"),
        ],
        Vec::new(),
    );

    let tasks = list_tasks(&compute, &key("inv-a"), &StatusFilter::All)
        .await
        .expect("listing succeeds");

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "t-1");
}

#[tokio::test]
async fn test_list_cluster_tasks_ignores_tags() {
    let compute = MemoryCompute::with(
        vec![
            task("t-1", TaskStatus::Running, "prod-1", "inv-a"),
            task("t-2", TaskStatus::Running, "prod-2", "inv-b"),
            task("t-3", TaskStatus::Stopped, "prod-2", "inv-b"),
        ],
        Vec::new(),
    );

    let tasks = list_cluster_tasks(&compute, &StatusFilter::parse("running"))
        .await
        .expect("listing succeeds");

    assert_eq!(tasks.len(), 2);
}

#[tokio::test]
async fn test_task_definitions_empty_is_not_an_error() {
    let compute = MemoryCompute::default();

    let arns = list_task_definition_arns(&compute, "boundary-dev-prod-1-inv-a")
        .await
        .expect("empty listing is fine");

    assert!(arns.is_empty());
}

#[tokio::test]
async fn test_task_definitions_exclude_longer_family() {
    let compute = MemoryCompute::with(
        Vec::new(),
        vec![
            task_def_arn("boundary-dev-prod-1-inv-a", 1),
            task_def_arn("boundary-dev-prod-1-inv-a", 2),
            task_def_arn("boundary-dev-prod-1-inv-a-b", 1),
        ],
    );

    let arns = list_task_definition_arns(&compute, "boundary-dev-prod-1-inv-a")
        .await
        .expect("listing succeeds");

    assert_eq!(
        arns,
        vec![
            task_def_arn("boundary-dev-prod-1-inv-a", 1),
            task_def_arn("boundary-dev-prod-1-inv-a", 2),
        ]
    );
}
