//! `boundary create-investigation`: provision an investigation workspace.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::gateway::LambdaGateway;
use crate::application::services::provisioning::{self, ProvisionOptions, TaskLaunch};
use crate::domain::EndpointTarget;
use crate::infra::auth::KeycloakPkceAuthenticator;
use crate::infra::aws::{LambdaInvokeTransport, StsFederation};
use crate::infra::http::FunctionUrlTransport;
use crate::output::TerminalReporter;

/// Arguments for `create-investigation`.
#[derive(Args)]
pub struct CreateArgs {
    /// Cluster ID (defaults to the configured cluster_name)
    #[arg(long)]
    pub cluster_id: Option<String>,

    /// Investigation ID (generated when omitted)
    #[arg(long)]
    pub investigation_id: Option<String>,

    /// Ignore any cached login and authenticate again
    #[arg(long)]
    pub force_login: bool,

    /// Also launch an investigation task
    #[arg(long)]
    pub start_task: bool,

    /// OpenShift client version for the task
    #[arg(long, requires = "start_task")]
    pub oc_version: Option<String>,

    /// Task lifetime in seconds
    #[arg(long, requires = "start_task")]
    pub task_timeout: Option<u64>,
}

/// Run `create-investigation`.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or any provisioning step
/// fails.
pub async fn run(app: &AppContext, args: CreateArgs) -> Result<()> {
    let config = &app.config;

    // Incomplete configuration is rejected before the browser opens.
    let pkce = config.pkce()?;
    let invoker_role_arn = config.invoker_role_arn()?.to_string();
    let endpoint = config.endpoint()?;

    let opts = ProvisionOptions {
        cluster_id: args
            .cluster_id
            .unwrap_or_else(|| config.cluster_name.clone()),
        investigation_id: args.investigation_id,
        force_login: args.force_login,
        pkce,
        region: config.aws_region.clone(),
        invoker_role_arn,
        start_task: args.start_task.then(|| TaskLaunch {
            oc_version: args.oc_version,
            task_timeout: args.task_timeout,
        }),
        cancel: app.cancel.clone(),
    };

    let auth = KeycloakPkceAuthenticator::new(app.token_cache_path()?)?;
    let reporter = TerminalReporter::new(&app.output);
    let mut rng = rand::rng();

    let summary = match endpoint {
        EndpointTarget::FunctionName(name) => {
            let gateway =
                LambdaGateway::new(LambdaInvokeTransport::new(name, config.aws_region.clone()));
            provisioning::create_investigation(
                &auth,
                &StsFederation,
                &gateway,
                &reporter,
                &opts,
                &mut rng,
            )
            .await?
        }
        EndpointTarget::FunctionUrl(url) => {
            let gateway = LambdaGateway::new(FunctionUrlTransport::new(url)?);
            provisioning::create_investigation(
                &auth,
                &StsFederation,
                &gateway,
                &reporter,
                &opts,
                &mut rng,
            )
            .await?
        }
    };

    app.emit(&summary, |r| r.render_provision(&summary))
}
