use crate::config::scoring::StabilityConfig;
use crate::domain::history::HistorySeries;
use crate::domain::scores::{ScoreLevel, ScoreResult};
use statrs::statistics::Statistics;

/// Price stability from the coefficient of variation. `raw` carries the CV itself.
pub fn score_stability(prices: &HistorySeries, cfg: &StabilityConfig) -> ScoreResult {
    let values = prices.values();
    if values.len() < 2 {
        return neutral(cfg, format!("UNKNOWN: {} price points", values.len()));
    }

    let mean = values.iter().mean();
    if !(mean > 0.0) {
        return neutral(cfg, "UNKNOWN: mean price is not positive");
    }

    let cv = values.iter().population_std_dev() / mean;
    let normalized = 100.0 * (1.0 - cv / cfg.cv_ceiling);
    let rounded = normalized.clamp(0.0, 100.0).round();
    let level = if rounded >= cfg.stable_at as f64 {
        ScoreLevel::Stable
    } else if rounded >= cfg.moderate_at as f64 {
        ScoreLevel::Moderate
    } else {
        ScoreLevel::Volatile
    };

    ScoreResult::new(
        cv,
        normalized.clamp(0.0, 100.0),
        level,
        format!("cv={cv:.3} over {} points, mean={mean:.2}", values.len()),
    )
}

fn neutral(cfg: &StabilityConfig, note: impl Into<String>) -> ScoreResult {
    ScoreResult::new(0.0, cfg.neutral_score, ScoreLevel::Unknown, note)
}
