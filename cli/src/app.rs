//! Application context: unified state passed to every command handler.
//!
//! Resolves configuration once (flags > `BOUNDARY_*` env > file > defaults)
//! and owns the cancellation token shared with the Ctrl-C handler.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::domain::BoundaryConfig;
use crate::infra::config::YamlConfigStore;
use crate::output::{HumanRenderer, OutputContext, json};

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flag-level configuration overrides.
#[derive(Default)]
pub struct ConfigFlags {
    /// `--config` / `BOUNDARY_CONFIG`.
    pub path: Option<PathBuf>,
    /// `--region`.
    pub region: Option<String>,
    /// `--cluster-name`.
    pub cluster_name: Option<String>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub config: ConfigFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet, JSON).
    pub output: OutputContext,
    pub config_store: YamlConfigStore,
    /// Effective configuration.
    pub config: BoundaryConfig,
    /// Cancelled on Ctrl-C.
    pub cancel: CancellationToken,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be parsed or an override is
    /// invalid.
    pub fn new(flags: AppFlags, cancel: CancellationToken) -> Result<Self> {
        let config_store = YamlConfigStore::new(flags.config.path);
        let mut config = config_store.load_with_env()?;
        if let Some(region) = &flags.config.region {
            config.set("aws_region", region)?;
        }
        if let Some(cluster_name) = &flags.config.cluster_name {
            config.set("cluster_name", cluster_name)?;
        }

        Ok(Self {
            output: OutputContext::new(
                flags.output.no_color,
                flags.output.quiet,
                flags.output.json,
            ),
            config_store,
            config,
            cancel,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.output.json
    }

    /// Token cache path, next to the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if no config location can be determined.
    pub fn token_cache_path(&self) -> Result<PathBuf> {
        Ok(self.config_store.dir()?.join("token.json"))
    }

    /// Emit a command result: `value` as JSON in JSON mode, otherwise through
    /// `human`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn emit<T: Serialize>(
        &self,
        value: &T,
        human: impl FnOnce(&HumanRenderer<'_>),
    ) -> Result<()> {
        if self.is_json() {
            println!("{}", json::format_value(value)?);
        } else {
            human(&HumanRenderer::new(&self.output));
        }
        Ok(())
    }
}
