//! `boundary close-investigation`: tear down an investigation workspace.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::teardown::{self, TeardownOptions, WaitPolicy};
use crate::domain::InvestigationKey;
use crate::infra::aws::{EcsCompute, EfsStorage, load_sdk_config};
use crate::infra::prompt::StdinConfirmer;
use crate::output::TerminalReporter;

/// Arguments for `close-investigation`.
#[derive(Args)]
pub struct CloseArgs {
    /// Cluster ID
    #[arg(long)]
    pub cluster_id: String,

    /// Investigation ID
    #[arg(long)]
    pub investigation_id: String,

    /// Stop running tasks before deleting (default: refuse while tasks run)
    #[arg(long)]
    pub force: bool,

    /// Skip the confirmation prompt for access point deletion
    #[arg(short, long)]
    pub yes: bool,

    /// EFS filesystem holding the access point (defaults to the configured
    /// efs_filesystem_id)
    #[arg(long)]
    pub efs_filesystem_id: Option<String>,
}

/// Run `close-investigation`.
///
/// # Errors
///
/// Returns an error if the key is invalid, configuration is incomplete, or a
/// fatal teardown step fails.
pub async fn run(app: &AppContext, args: CloseArgs) -> Result<()> {
    let config = &app.config;
    let key = InvestigationKey::new(args.cluster_id, args.investigation_id)?;
    let file_system_id = match args.efs_filesystem_id {
        Some(id) => id,
        None => config.efs_filesystem_id()?.to_string(),
    };

    let sdk_config = load_sdk_config(&config.aws_region).await;
    let storage = EfsStorage::new(&sdk_config, file_system_id);
    let compute = EcsCompute::new(&sdk_config, config.cluster_name.clone());

    let opts = TeardownOptions {
        cluster_name: config.cluster_name.clone(),
        force: args.force,
        skip_confirm: args.yes,
        wait: WaitPolicy {
            poll_interval: config.poll_interval(),
            timeout: config.task_stop_timeout(),
        },
        cancel: app.cancel.clone(),
    };

    let reporter = TerminalReporter::new(&app.output);
    let summary = teardown::close_investigation(
        &storage,
        &compute,
        &StdinConfirmer,
        &reporter,
        &key,
        &opts,
    )
    .await?;

    app.emit(&summary, |r| r.render_teardown(&summary))
}
