//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::application::services::provisioning::ProvisionSummary;
use crate::application::services::teardown::TeardownSummary;
use crate::domain::config::{BoundaryConfig, CONFIG_KEYS, env_var_name};
use crate::domain::{Task, task_id_from_arn};
use crate::output::OutputContext;

const RULE: &str = "========================================";

/// Renders command results as human-readable terminal output.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    fn banner(&self, title: &str) {
        println!();
        println!("{}", RULE.style(self.ctx.styles.dim));
        println!("{}", title.style(self.ctx.styles.header));
        println!("{}", RULE.style(self.ctx.styles.dim));
        println!();
    }

    /// Render the outcome of `create-investigation`.
    pub fn render_provision(&self, summary: &ProvisionSummary) {
        self.banner("Investigation Workspace Created");
        self.ctx.kv("Cluster:", &summary.cluster_id);
        self.ctx.kv("Investigation:", &summary.investigation_id);
        self.ctx.kv("Access point:", &summary.access_point_id);
        if let Some(task_arn) = &summary.task_arn {
            self.ctx.kv("Task:", task_arn);
        }
        if let Some(owner) = &summary.owner {
            self.ctx.kv("Owner:", owner);
        }
        println!();
        println!("Close this investigation when done:");
        println!(
            "  boundary close-investigation --cluster-id {} --investigation-id {} --force",
            summary.cluster_id, summary.investigation_id
        );
    }

    /// Render the outcome of `close-investigation`.
    pub fn render_teardown(&self, summary: &TeardownSummary) {
        self.banner("Investigation Closed");
        self.ctx.kv("Cluster:", &summary.cluster_id);
        self.ctx.kv("Investigation:", &summary.investigation_id);
        self.ctx.kv(
            "Access point:",
            &format!("{} (deleted)", summary.access_point_id),
        );
        self.ctx.kv("Tasks stopped:", &summary.tasks_stopped.to_string());
        self.ctx
            .kv("Task defs removed:", &summary.task_defs_removed.to_string());
        if !summary.warnings.is_empty() {
            println!();
            println!(
                "{}",
                format!("Warnings ({}):", summary.warnings.len()).style(self.ctx.styles.warning)
            );
            for w in &summary.warnings {
                println!(
                    "  {} [{}] {}: {}",
                    "!".style(self.ctx.styles.warning),
                    w.step,
                    w.resource,
                    w.message
                );
            }
        }
        println!();
        println!("Note: filesystem data under {} is preserved.", summary.access_point_path);
    }

    /// Render a task table.
    pub fn render_tasks(&self, tasks: &[Task]) {
        if tasks.is_empty() {
            println!("No tasks found.");
            return;
        }
        println!(
            "{}",
            format!(
                "{:<34} {:<14} {:<20} {:<24} {:<16} {}",
                "TASK ID", "STATUS", "CLUSTER", "INVESTIGATION", "USERNAME", "STARTED"
            )
            .style(self.ctx.styles.bold)
        );
        for task in tasks {
            let started = task
                .started_at
                .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
            println!(
                "{:<34} {:<14} {:<20} {:<24} {:<16} {started}",
                task_id_from_arn(&task.id),
                task.status.as_str(),
                or_dash(task.tag(boundary_common::CLUSTER_ID_TAG)),
                or_dash(task.tag(boundary_common::INVESTIGATION_ID_TAG)),
                or_dash(task.tag(boundary_common::USERNAME_TAG)),
            );
        }
    }

    /// Render the effective configuration.
    pub fn render_config(&self, config: &BoundaryConfig, path: &Path) {
        println!(
            "{}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        for key in CONFIG_KEYS {
            let value = config.get(key).unwrap_or_else(|| "(not set)".to_string());
            println!("  {:<24} {value}", format!("{key}:"));
        }
        println!();
        println!("  {}", "Environment overrides:".style(self.ctx.styles.bold));
        for key in CONFIG_KEYS {
            let name = env_var_name(key);
            if let Ok(value) = std::env::var(&name) {
                println!("    {name}={value}");
            }
        }
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
