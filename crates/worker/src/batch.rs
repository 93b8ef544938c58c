use anyhow::Context;
use sourcing_core::config::ScoringConfig;
use sourcing_core::domain::contract::SightingBatchFile;
use sourcing_core::domain::sighting::BatchClassification;
use sourcing_core::scoring::sighting::classify_batch;
use std::path::Path;

/// Classifies every item in a batch file. Revenant gaps are measured from the
/// batch's own `generated_at`, not the wall clock.
pub async fn run(
    cfg: &ScoringConfig,
    path: &Path,
    top_n: Option<usize>,
) -> anyhow::Result<BatchClassification> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read batch {}", path.display()))?;
    classify_text(cfg, &text, top_n)
        .with_context(|| format!("invalid batch {}", path.display()))
}

fn classify_text(
    cfg: &ScoringConfig,
    text: &str,
    top_n: Option<usize>,
) -> anyhow::Result<BatchClassification> {
    let file: SightingBatchFile = serde_json::from_str(text).context("batch is not valid JSON")?;
    let generated_at = file.generated_at;
    let candidates = file.validate_and_into_candidates()?;

    let mut sighting_cfg = cfg.sighting.clone();
    if let Some(n) = top_n {
        anyhow::ensure!(n > 0, "--top-n must be positive");
        sighting_cfg.shortlist_size = n;
    }

    Ok(classify_batch(&candidates, generated_at, &sighting_cfg))
}
