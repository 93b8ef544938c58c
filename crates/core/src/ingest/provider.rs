use crate::config::Settings;
use crate::ingest::types::RawPayload;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[async_trait::async_trait]
pub trait PayloadSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch_payload(&self, identifier: &str) -> Result<RawPayload>;
}

/// Reads `<dir>/<identifier>.json` files written by the upstream fetch job.
#[derive(Debug, Clone)]
pub struct JsonDirPayloadSource {
    dir: PathBuf,
}

impl JsonDirPayloadSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(settings.require_payload_dir()?))
    }

    fn path_for(&self, identifier: &str) -> PathBuf {
        self.dir.join(format!("{identifier}.json"))
    }
}

#[async_trait::async_trait]
impl PayloadSource for JsonDirPayloadSource {
    fn source_name(&self) -> &'static str {
        "json_dir"
    }

    async fn fetch_payload(&self, identifier: &str) -> Result<RawPayload> {
        let identifier = identifier.trim();
        anyhow::ensure!(!identifier.is_empty(), "identifier must be non-empty");
        anyhow::ensure!(
            !identifier.contains(['/', '\\']),
            "identifier must not contain path separators: {identifier}"
        );

        let path = self.path_for(identifier);
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read payload {}", path.display()))?;
        let parsed = serde_json::from_str::<RawPayload>(&text)
            .with_context(|| format!("failed to parse payload {} into RawPayload", path.display()))?;

        validate_payload(&parsed, identifier)?;
        Ok(parsed)
    }
}

fn validate_payload(payload: &RawPayload, expected: &str) -> Result<()> {
    let asin = payload.asin.trim();
    anyhow::ensure!(!asin.is_empty(), "payload identifier must be non-empty");
    anyhow::ensure!(
        asin == expected,
        "payload identifier mismatch: expected {expected}, got {asin}"
    );
    Ok(())
}
