use crate::config::scoring::ConfidenceConfig;
use crate::domain::history::HistorySeries;
use crate::domain::scores::{ScoreLevel, ScoreResult};
use chrono::{DateTime, Utc};

/// How far the other scores can be trusted, from data volume, freshness and
/// the number of independent signal types behind them.
pub fn score_confidence(
    series: &HistorySeries,
    signal_types: usize,
    now: DateTime<Utc>,
    cfg: &ConfidenceConfig,
) -> ScoreResult {
    let Some(latest) = series.latest() else {
        return ScoreResult::new(0.0, 0.0, ScoreLevel::Low, "no data points");
    };

    let count_factor = (series.len() as f64 / cfg.target_points as f64).min(1.0);

    let age_hours = ((now - latest.timestamp).num_seconds() as f64 / 3600.0).max(0.0);
    let recency_factor = if age_hours <= cfg.fresh_hours {
        1.0
    } else {
        0.5_f64.powf((age_hours - cfg.fresh_hours) / cfg.half_life_hours)
    };

    let signal_factor = (signal_types as f64 / cfg.target_signal_types as f64).min(1.0);

    let raw = cfg.count_weight * count_factor
        + cfg.recency_weight * recency_factor
        + cfg.signal_weight * signal_factor;
    let normalized = raw * 100.0;
    let level = if normalized.round() >= cfg.high_at as f64 {
        ScoreLevel::High
    } else if normalized.round() >= cfg.medium_at as f64 {
        ScoreLevel::Medium
    } else {
        ScoreLevel::Low
    };

    ScoreResult::new(
        raw,
        normalized,
        level,
        format!(
            "points={} age_hours={age_hours:.1} signals={signal_types}",
            series.len()
        ),
    )
}
