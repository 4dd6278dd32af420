// Runner configuration management
use anyhow::{bail, Context, Result};
use judge_common::env;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config/runner.json";
const DEFAULT_UNIT_BINARY: &str = "target/release/judge-unit";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Execution unit binary to spawn per run
    #[serde(default = "default_unit_binary")]
    pub unit_binary: PathBuf,
    /// Wall-clock limit for a whole run
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_unit_binary() -> PathBuf {
    PathBuf::from(DEFAULT_UNIT_BINARY)
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            unit_binary: default_unit_binary(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl RunnerConfig {
    /// Load runner configuration from a JSON file
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Runner config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: RunnerConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        if config.timeout_ms == 0 {
            bail!("timeout_ms must be greater than zero");
        }

        Ok(config)
    }

    /// Load config/runner.json, or built-in defaults when it is absent
    pub fn load_default() -> Result<Self> {
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            Self::load(default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply JUDGE_UNIT_BIN if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(path) = std::env::var_os(env::UNIT_BIN).filter(|p| !p.is_empty()) {
            self.unit_binary = PathBuf::from(path);
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
