use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use tessera_sync::ReplicatorConfig;

use crate::cli::OutputFormat;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tessera.toml";

/// Store directory used when neither flag nor config names one.
pub const DEFAULT_STORE_DIR: &str = ".tessera";

/// Settings read from `tessera.toml`. Command-line flags take precedence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub store: Option<PathBuf>,
    pub output: Option<OutputFormat>,
    pub replicator: ReplicatorConfig,
}

impl CliConfig {
    /// Load `path`, or the default file if it exists, or the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::read(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn store_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.store.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR))
    }

    pub fn output(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or(self.output).unwrap_or_default()
    }
}
