//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::app::{AppContext, AppFlags, ConfigFlags, OutputFlags};
use crate::commands;
use crate::output::OutputContext;

/// Open and close investigation workspaces
#[derive(Parser)]
#[command(
    name = "boundary",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(long, global = true, env = "BOUNDARY_CONFIG")]
    pub config: Option<PathBuf>,

    /// AWS region
    #[arg(long, global = true, env = "BOUNDARY_AWS_REGION")]
    pub region: Option<String>,

    /// ECS cluster hosting investigation tasks
    #[arg(long, global = true, env = "BOUNDARY_CLUSTER_NAME")]
    pub cluster_name: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an investigation workspace (EFS access point)
    CreateInvestigation(commands::CreateArgs),

    /// Stop tasks, deregister task definitions, and delete the access point
    CloseInvestigation(commands::CloseArgs),

    /// List tasks in the cluster
    ListTasks(commands::ListTasksArgs),

    /// Interactively write the config file
    Configure,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the command
    /// fails.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            config,
            region,
            cluster_name,
            command,
        } = self;

        if let Command::Version = command {
            return commands::version::run(&OutputContext::new(no_color, quiet, json));
        }

        let app = AppContext::new(
            AppFlags {
                output: OutputFlags {
                    no_color,
                    quiet,
                    json,
                },
                config: ConfigFlags {
                    path: config,
                    region,
                    cluster_name,
                },
            },
            cancel,
        )?;

        match command {
            Command::CreateInvestigation(args) => commands::create::run(&app, args).await,
            Command::CloseInvestigation(args) => commands::close::run(&app, args).await,
            Command::ListTasks(args) => commands::list_tasks::run(&app, &args).await,
            Command::Configure => commands::configure::run(&app),
            Command::Version => Ok(()),
        }
    }
}
