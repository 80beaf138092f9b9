//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::application::ports::ConfigStore;
use crate::domain::config::BoundaryConfig;

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
#[derive(Debug, Clone, Default)]
pub struct YamlConfigStore {
    /// `--config` / `BOUNDARY_CONFIG`.
    path_override: Option<PathBuf>,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(path_override: Option<PathBuf>) -> Self {
        Self { path_override }
    }

    /// Directory holding the config file and the token cache.
    ///
    /// # Errors
    ///
    /// Returns an error if no config location can be determined.
    pub fn dir(&self) -> Result<PathBuf> {
        let path = self.path()?;
        Ok(path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf))
    }

    /// Stored configuration with `BOUNDARY_*` environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or an override is invalid.
    pub fn load_with_env(&self) -> Result<BoundaryConfig> {
        let mut config = self.load()?;
        config
            .apply_env(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
            .context("invalid environment override")?;
        Ok(config)
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<BoundaryConfig> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(BoundaryConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(BoundaryConfig::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn save(&self, config: &BoundaryConfig) -> Result<()> {
        let path = self.path()?;
        let content = serde_yaml::to_string(config).context("cannot serialize config")?;
        write_private(&path, &content)
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path_override {
            return Ok(path.clone());
        }
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(xdg).join("boundary").join("config.yaml"));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".config").join("boundary").join("config.yaml"))
    }
}

/// Write `content` to `path`, creating parents, with mode 0600 on unix.
pub(crate) fn write_private(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("cannot set permissions on {}", path.display()))?;
    }
    Ok(())
}
