use crate::config::scoring::VelocityConfig;
use crate::domain::history::HistorySeries;
use crate::domain::scores::{ScoreLevel, ScoreResult};
use statrs::statistics::Statistics;

/// Which way a metric moves when things get better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sales rank: a smaller number means more sales.
    LowerIsBetter,
    HigherIsBetter,
}

/// Compares the earliest and latest windows of an ascending series.
///
/// The window is the configured size, shrunk to half the series so the two
/// windows never overlap. Too little data returns the fallback score with an
/// explanatory note instead of a computed one.
pub fn score_velocity(series: &HistorySeries, direction: Direction, cfg: &VelocityConfig) -> ScoreResult {
    let values = series.values();
    if values.len() < cfg.min_points {
        return fallback(
            cfg,
            format!(
                "insufficient data: {} points, need {}",
                values.len(),
                cfg.min_points
            ),
        );
    }

    let window = cfg.window.min(values.len() / 2).max(1);
    let older_avg = values[..window].iter().mean();
    let recent_avg = values[values.len() - window..].iter().mean();

    if !(older_avg > 0.0) || !recent_avg.is_finite() {
        return fallback(cfg, "insufficient data: older window average is not positive");
    }

    let change = (older_avg - recent_avg) / older_avg;
    let improvement = match direction {
        Direction::LowerIsBetter => change,
        Direction::HigherIsBetter => -change,
    }
    .clamp(-1.0, 1.0);

    let raw = 0.5 + improvement * 0.5;
    let normalized = raw * 100.0;
    let level = if normalized.round() >= cfg.improving_at as f64 {
        ScoreLevel::Improving
    } else if normalized.round() <= cfg.declining_at as f64 {
        ScoreLevel::Declining
    } else {
        ScoreLevel::Flat
    };

    ScoreResult::new(
        raw,
        normalized,
        level,
        format!(
            "window={window} older_avg={older_avg:.1} recent_avg={recent_avg:.1} improvement={:.1}%",
            improvement * 100.0
        ),
    )
}

fn fallback(cfg: &VelocityConfig, note: impl Into<String>) -> ScoreResult {
    ScoreResult::new(
        cfg.fallback_score / 100.0,
        cfg.fallback_score,
        ScoreLevel::Unknown,
        note,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::HistoryPoint;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: &[f64]) -> HistorySeries {
        let t0 = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        HistorySeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| HistoryPoint {
                    timestamp: t0 + Duration::days(i as i64),
                    value: *v,
                })
                .collect(),
        )
    }

    #[test]
    fn improving_rank_scores_above_midpoint() {
        let s = series(&[60000.0, 55000.0, 50000.0, 45000.0]);
        let r = score_velocity(&s, Direction::LowerIsBetter, &VelocityConfig::default());

        // Windows of two: 57500 -> 47500.
        let improvement = (57500.0 - 47500.0) / 57500.0;
        assert!((r.raw - (0.5 + improvement * 0.5)).abs() < 1e-9);
        assert!(r.normalized > 50);
        assert_eq!(r.level, ScoreLevel::Improving);
    }

    #[test]
    fn worsening_rank_declines() {
        let s = series(&[10000.0, 12000.0, 15000.0, 20000.0, 26000.0, 30000.0]);
        let r = score_velocity(&s, Direction::LowerIsBetter, &VelocityConfig::default());
        assert!(r.normalized < 50);
        assert_eq!(r.level, ScoreLevel::Declining);
    }

    #[test]
    fn higher_is_better_flips_sign() {
        let s = series(&[10.0, 10.0, 20.0, 20.0]);
        let r = score_velocity(&s, Direction::HigherIsBetter, &VelocityConfig::default());
        assert_eq!(r.normalized, 100);
    }

    #[test]
    fn short_series_returns_fallback_with_note() {
        let s = series(&[5000.0, 4000.0]);
        let r = score_velocity(&s, Direction::LowerIsBetter, &VelocityConfig::default());
        assert_eq!(r.normalized, 50);
        assert_eq!(r.level, ScoreLevel::Unknown);
        assert!(r.notes.contains("insufficient data"));
    }

    #[test]
    fn flat_series_is_flat() {
        let s = series(&[5000.0; 10]);
        let r = score_velocity(&s, Direction::LowerIsBetter, &VelocityConfig::default());
        assert_eq!(r.normalized, 50);
        assert_eq!(r.level, ScoreLevel::Flat);
    }

    #[test]
    fn uses_configured_window_on_long_series() {
        let mut values = vec![100.0; 7];
        values.extend([90.0; 6]);
        values.extend([50.0; 7]);
        let s = series(&values);
        let r = score_velocity(&s, Direction::LowerIsBetter, &VelocityConfig::default());
        // Oldest 7 average 100, newest 7 average 50.
        assert!((r.raw - 0.75).abs() < 1e-9);
    }
}
