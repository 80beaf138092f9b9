//! `boundary list-tasks`: tasks in the configured cluster.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::discovery;
use crate::domain::{LifecycleError, StatusFilter, Step};
use crate::infra::aws::{EcsCompute, load_sdk_config};

/// Arguments for `list-tasks`.
#[derive(Args)]
pub struct ListTasksArgs {
    /// Task status filter: RUNNING, STOPPED, or all
    #[arg(long, default_value = "RUNNING")]
    pub status: String,
}

/// Run `list-tasks`.
///
/// # Errors
///
/// Returns an error if the cluster cannot be queried.
pub async fn run(app: &AppContext, args: &ListTasksArgs) -> Result<()> {
    let config = &app.config;
    let filter = StatusFilter::parse(&args.status);

    let sdk_config = load_sdk_config(&config.aws_region).await;
    let compute = EcsCompute::new(&sdk_config, config.cluster_name.clone());
    let mut tasks = discovery::list_cluster_tasks(&compute, &filter)
        .await
        .map_err(|e| LifecycleError::cloud(Step::Inventory, config.cluster_name.clone(), e))?;
    tasks.sort_by(|a, b| b.started_at.cmp(&a.started_at));

    app.emit(&tasks, |r| r.render_tasks(&tasks))
}
