use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::types::EnrichmentOptions;

/// Batch sizes the dashboard offers.
pub const SUPPORTED_BATCH_SIZES: [usize; 3] = [5, 10, 25];

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 1000;
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROVIDER_URL: &str = "https://api.apollo.io";

/// TOML-backed run configuration. Secrets stay in the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FileConfig {
    pub run: RunSettings,
    pub options: EnrichmentOptions,
    pub provider: ProviderSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RunSettings {
    pub batch_size: usize,
    pub inter_batch_delay_ms: u64,
    pub call_timeout_secs: u64,
    /// Drop duplicate contacts before the run starts.
    pub dedupe: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay_ms: DEFAULT_INTER_BATCH_DELAY_MS,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
            dedupe: false,
        }
    }
}

impl RunSettings {
    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProviderSettings {
    /// Provider API root, used when calling the provider directly.
    pub base_url: String,
    /// A deployed enrichment function. When set, batches go through it instead.
    pub proxy_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            proxy_url: None,
        }
    }
}

impl FileConfig {
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_BATCH_SIZES.contains(&self.run.batch_size) {
            bail!(
                "run.batch_size must be one of {:?}, got {}",
                SUPPORTED_BATCH_SIZES,
                self.run.batch_size
            );
        }
        if self.run.call_timeout_secs == 0 {
            bail!("run.call_timeout_secs must be greater than 0");
        }
        Ok(())
    }
}

/// Load and parse a TOML config file. A missing path yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Secrets loaded from the environment (and `.env` when present).
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub apollo_api_key: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let secrets = Self {
            apollo_api_key: std::env::var("APOLLO_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
        };
        secrets.log_keys();
        secrets
    }

    fn log_keys(&self) {
        tracing::info!("Secrets loaded:");
        tracing::info!("  APOLLO_API_KEY: {}", preview_opt(&self.apollo_api_key));
    }
}

/// First few characters of a secret plus its length, for logs.
pub fn preview(val: &str) -> String {
    let n: usize = val.chars().take(5).map(char::len_utf8).sum();
    format!("{}...({} chars)", &val[..n], val.chars().count())
}

fn preview_opt(val: &Option<String>) -> String {
    match val {
        Some(v) if !v.is_empty() => preview(v),
        _ => "<not set>".to_string(),
    }
}
