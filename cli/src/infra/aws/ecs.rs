//! ECS tasks and task definitions as the [`ComputeClient`] port.

use std::collections::HashMap;

use aws_config::SdkConfig;
use aws_sdk_ecs::types::{DesiredStatus, TaskDefinitionStatus, TaskField};
use chrono::DateTime;
use tracing::debug;

use crate::application::ports::ComputeClient;
use crate::domain::{CloudError, StatusFilter, Task, TaskStatus, task_id_from_arn};
use crate::infra::aws::{classify, code_ends_with_not_found};

/// `DescribeTasks` accepts at most this many tasks per call.
const DESCRIBE_BATCH: usize = 100;

/// Tasks and task definitions of one ECS cluster.
pub struct EcsCompute {
    client: aws_sdk_ecs::Client,
    cluster: String,
}

impl EcsCompute {
    #[must_use]
    pub fn new(config: &SdkConfig, cluster: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_ecs::Client::new(config),
            cluster: cluster.into(),
        }
    }

    async fn list_task_arns(&self, desired: DesiredStatus) -> Result<Vec<String>, CloudError> {
        let mut arns = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let resp = self
                .client
                .list_tasks()
                .cluster(&self.cluster)
                .desired_status(desired.clone())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| classify("ListTasks", &self.cluster, &e, cluster_not_found))?;
            arns.extend(resp.task_arns().iter().cloned());
            match resp.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(arns)
    }

    async fn describe(&self, arns: &[String]) -> Result<Vec<Task>, CloudError> {
        let mut tasks = Vec::with_capacity(arns.len());
        for chunk in arns.chunks(DESCRIBE_BATCH) {
            let resp = self
                .client
                .describe_tasks()
                .cluster(&self.cluster)
                .set_tasks(Some(chunk.to_vec()))
                .include(TaskField::Tags)
                .send()
                .await
                .map_err(|e| classify("DescribeTasks", &self.cluster, &e, cluster_not_found))?;
            tasks.extend(resp.tasks().iter().filter_map(to_task));
        }
        Ok(tasks)
    }
}

impl ComputeClient for EcsCompute {
    async fn list_tasks(&self, filter: &StatusFilter) -> Result<Vec<Task>, CloudError> {
        let mut arns = Vec::new();
        for desired in desired_statuses(filter) {
            arns.extend(self.list_task_arns(desired).await?);
        }
        arns.sort();
        arns.dedup();
        debug!(cluster = %self.cluster, count = arns.len(), ?filter, "listed task arns");
        self.describe(&arns).await
    }

    async fn describe_task(&self, task_id: &str) -> Result<Option<Task>, CloudError> {
        let tasks = self.describe(&[task_id.to_string()]).await?;
        Ok(tasks.into_iter().next())
    }

    async fn stop_task(&self, task_id: &str, reason: &str) -> Result<(), CloudError> {
        self.client
            .stop_task()
            .cluster(&self.cluster)
            .task(task_id)
            .reason(reason)
            .send()
            .await
            .map_err(|e| classify("StopTask", &format!("task {task_id}"), &e, task_not_found))?;
        debug!(task_id, "stop requested");
        Ok(())
    }

    async fn list_task_definition_arns(
        &self,
        family_prefix: &str,
    ) -> Result<Vec<String>, CloudError> {
        let mut arns = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let resp = self
                .client
                .list_task_definitions()
                .family_prefix(family_prefix)
                .status(TaskDefinitionStatus::Active)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| classify("ListTaskDefinitions", family_prefix, &e, |_, _| false))?;
            arns.extend(resp.task_definition_arns().iter().cloned());
            match resp.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(arns)
    }

    async fn deregister_task_definition(&self, arn: &str) -> Result<(), CloudError> {
        self.client
            .deregister_task_definition()
            .task_definition(arn)
            .send()
            .await
            .map_err(|e| classify("DeregisterTaskDefinition", arn, &e, |_, _| false))?;
        debug!(arn, "deregistered task definition");
        Ok(())
    }
}

/// `ListTasks` only filters on desired status, so the exact filter is applied
/// again by the caller.
fn desired_statuses(filter: &StatusFilter) -> Vec<DesiredStatus> {
    match filter {
        StatusFilter::Only(
            TaskStatus::Provisioning
            | TaskStatus::Pending
            | TaskStatus::Activating
            | TaskStatus::Running,
        ) => vec![DesiredStatus::Running],
        StatusFilter::Only(
            TaskStatus::Deactivating
            | TaskStatus::Stopping
            | TaskStatus::Deprovisioning
            | TaskStatus::Stopped
            | TaskStatus::Deleted,
        ) => vec![DesiredStatus::Stopped],
        StatusFilter::All | StatusFilter::Only(TaskStatus::Other(_)) => {
            vec![DesiredStatus::Running, DesiredStatus::Stopped]
        }
    }
}

fn to_task(task: &aws_sdk_ecs::types::Task) -> Option<Task> {
    let id = task_id_from_arn(task.task_arn()?).to_string();
    let Ok(status) = task.last_status().unwrap_or_default().parse::<TaskStatus>();
    let tags: HashMap<String, String> = task
        .tags()
        .iter()
        .filter_map(|t| Some((t.key()?.to_string(), t.value().unwrap_or_default().to_string())))
        .collect();
    let started_at = task
        .started_at()
        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()));
    Some(Task {
        id,
        status,
        tags,
        started_at,
    })
}

fn cluster_not_found(code: &str, _message: &str) -> bool {
    code == "ClusterNotFoundException"
}

/// ECS reports an unknown task as an invalid parameter.
fn task_not_found(code: &str, message: &str) -> bool {
    code_ends_with_not_found(code, message)
        || (code == "InvalidParameterException"
            && message.to_ascii_lowercase().contains("not found"))
}
