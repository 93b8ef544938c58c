use anyhow::Context;
use chrono::{DateTime, Utc};
use sourcing_core::config::{ScoringConfig, Settings};
use sourcing_core::domain::economics::Money;
use sourcing_core::domain::sighting::PriorSighting;
use sourcing_core::ingest::provider::{JsonDirPayloadSource, PayloadSource};
use sourcing_core::pipeline::{analyze_product, CostInputs, ProductReport};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub identifier: String,
    /// Dollars.
    pub buy_cost: f64,
    pub fees: f64,
    pub sale_price: Option<f64>,
    pub sightings: Option<PathBuf>,
}

impl AnalyzeOptions {
    pub fn cost_inputs(&self) -> anyhow::Result<CostInputs> {
        let buy_cost = Money::from_dollars(self.buy_cost)
            .with_context(|| format!("invalid --buy-cost {}", self.buy_cost))?;
        let fees = Money::from_dollars(self.fees)
            .with_context(|| format!("invalid --fees {}", self.fees))?;
        let sale_price = match self.sale_price {
            Some(p) => Some(
                Money::from_dollars(p).with_context(|| format!("invalid --sale-price {p}"))?,
            ),
            None => None,
        };
        Ok(CostInputs {
            buy_cost,
            fees,
            sale_price,
        })
    }
}

pub async fn run(
    settings: &Settings,
    cfg: &ScoringConfig,
    opts: &AnalyzeOptions,
    now: DateTime<Utc>,
) -> anyhow::Result<ProductReport> {
    let costs = opts.cost_inputs()?;
    let priors = match opts.sightings.as_deref() {
        Some(path) => read_prior_sightings(path).await?,
        None => Vec::new(),
    };

    let source = JsonDirPayloadSource::from_settings(settings)?;
    let payload = source.fetch_payload(&opts.identifier).await?;
    tracing::debug!(
        source = source.source_name(),
        asin = %payload.asin,
        priors = priors.len(),
        "payload loaded"
    );

    analyze_product(&payload, &costs, &priors, cfg, now)
}

async fn read_prior_sightings(path: &Path) -> anyhow::Result<Vec<PriorSighting>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read sightings {}", path.display()))?;
    let mut priors: Vec<PriorSighting> = serde_json::from_str(&text)
        .with_context(|| format!("sightings {} is not a JSON array of sightings", path.display()))?;
    priors.sort_by_key(|p| p.seen_at);
    Ok(priors)
}
