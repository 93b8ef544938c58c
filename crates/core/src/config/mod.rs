pub mod error;
pub mod scoring;

pub use error::ConfigError;
pub use scoring::ScoringConfig;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Settings {
    pub sentry_dsn: Option<String>,
    pub scoring_config_path: Option<String>,
    pub payload_dir: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            scoring_config_path: std::env::var("SCORING_CONFIG_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            payload_dir: std::env::var("PAYLOAD_DIR").ok(),
        })
    }

    pub fn require_payload_dir(&self) -> anyhow::Result<&str> {
        self.payload_dir
            .as_deref()
            .context("PAYLOAD_DIR is required")
    }

    /// Loads the scoring config from `SCORING_CONFIG_PATH`, or the defaults when unset.
    pub fn load_scoring_config(&self) -> anyhow::Result<ScoringConfig> {
        match self.scoring_config_path.as_deref() {
            Some(path) => ScoringConfig::from_path(path),
            None => {
                tracing::info!("SCORING_CONFIG_PATH not set; using default scoring config");
                Ok(ScoringConfig::default())
            }
        }
    }
}
