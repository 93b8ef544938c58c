//! Current sales-rank resolution.
//!
//! The provider publishes the "current rank" in several overlapping places with
//! different reliability. Strategies are tried in [`ExtractionStrategy::ORDER`];
//! the first one that yields a positive rank wins and tags the result with its
//! provenance.

use crate::config::scoring::ExtractionConfig;
use crate::ingest::array::{interleaved_pairs, valid_at};
use crate::ingest::types::{HistoryKind, RawPayload, RANK_INDEX};
use crate::time::to_calendar_time;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryScope {
    Primary,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy", content = "scope")]
pub enum ExtractionStrategy {
    CategoryMap(CategoryScope),
    LegacyArray,
    RecentHistory,
    RollingAverage,
}

impl ExtractionStrategy {
    pub const ORDER: [ExtractionStrategy; 5] = [
        ExtractionStrategy::CategoryMap(CategoryScope::Primary),
        ExtractionStrategy::CategoryMap(CategoryScope::Any),
        ExtractionStrategy::LegacyArray,
        ExtractionStrategy::RecentHistory,
        ExtractionStrategy::RollingAverage,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ExtractionStrategy::CategoryMap(CategoryScope::Primary) => "category_map:primary",
            ExtractionStrategy::CategoryMap(CategoryScope::Any) => "category_map:any",
            ExtractionStrategy::LegacyArray => "legacy_array",
            ExtractionStrategy::RecentHistory => "recent_history",
            ExtractionStrategy::RollingAverage => "rolling_average",
        }
    }

    pub fn base_multiplier(self, cfg: &ExtractionConfig) -> f64 {
        let m = &cfg.multipliers;
        match self {
            ExtractionStrategy::CategoryMap(CategoryScope::Primary) => m.category_primary,
            ExtractionStrategy::CategoryMap(CategoryScope::Any) => m.category_any,
            ExtractionStrategy::LegacyArray => m.legacy_array,
            ExtractionStrategy::RecentHistory => m.recent_history,
            ExtractionStrategy::RollingAverage => m.rolling_average,
        }
    }

    /// The resolved rank and the category whose ceiling applies to it.
    fn attempt(
        self,
        payload: &RawPayload,
        cfg: &ExtractionConfig,
        now: DateTime<Utc>,
    ) -> Option<(i64, Option<i64>)> {
        let primary = payload.primary_category();
        let (value, category) = match self {
            ExtractionStrategy::CategoryMap(CategoryScope::Primary) => {
                let category = primary?;
                let series = payload.sales_ranks.get(category.to_string())?;
                (latest_pair(series)?.1, Some(category))
            }
            ExtractionStrategy::CategoryMap(CategoryScope::Any) => {
                let primary_key = primary.map(|c| c.to_string());
                payload
                    .sales_ranks
                    .as_object()?
                    .iter()
                    .filter(|(key, _)| Some(key.as_str()) != primary_key.as_deref())
                    .find_map(|(key, series)| {
                        latest_pair(series).map(|(_, v)| (v, key.trim().parse::<i64>().ok()))
                    })?
            }
            ExtractionStrategy::LegacyArray => {
                (valid_at(payload.stats_field("current"), RANK_INDEX)?, primary)
            }
            ExtractionStrategy::RecentHistory => {
                let (minutes, v) = latest_pair(payload.history(HistoryKind::SalesRank))?;
                let age = now - to_calendar_time(minutes)?;
                if age > Duration::hours(cfg.recent_history_max_age_hours) {
                    return None;
                }
                (v, primary)
            }
            ExtractionStrategy::RollingAverage => {
                (valid_at(payload.stats_field("avg30"), RANK_INDEX)?, primary)
            }
        };

        let rank = value.round() as i64;
        (rank > 0).then_some((rank, category))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankExtraction {
    pub value: Option<i64>,
    pub provenance: Option<ExtractionStrategy>,
    pub confidence: f64,
}

impl RankExtraction {
    fn missing() -> Self {
        Self {
            value: None,
            provenance: None,
            confidence: 0.0,
        }
    }
}

pub fn extract_current_rank(
    payload: &RawPayload,
    cfg: &ExtractionConfig,
    now: DateTime<Utc>,
) -> RankExtraction {
    for strategy in ExtractionStrategy::ORDER {
        if let Some((rank, category)) = strategy.attempt(payload, cfg, now) {
            let confidence = rank_confidence(strategy, rank, category, cfg);
            tracing::debug!(
                asin = %payload.asin,
                strategy = strategy.tag(),
                rank,
                confidence,
                "resolved current rank"
            );
            return RankExtraction {
                value: Some(rank),
                provenance: Some(strategy),
                confidence,
            };
        }
    }

    tracing::debug!(asin = %payload.asin, "no rank source produced a value");
    RankExtraction::missing()
}

pub fn rank_confidence(
    strategy: ExtractionStrategy,
    rank: i64,
    category: Option<i64>,
    cfg: &ExtractionConfig,
) -> f64 {
    if rank <= 0 {
        return 0.0;
    }

    let mut confidence = strategy.base_multiplier(cfg) * magnitude_factor(rank);
    if rank > cfg.max_plausible_rank(category) {
        confidence = confidence.min(cfg.out_of_range_confidence_cap);
    }
    confidence.clamp(0.0, 1.0)
}

// Deep ranks are noisier and more often stale.
fn magnitude_factor(rank: i64) -> f64 {
    if rank < 10_000 {
        1.0
    } else if rank < 100_000 {
        0.9
    } else if rank <= 1_000_000 {
        0.75
    } else {
        0.5
    }
}

// Series order is not guaranteed, so "latest" means the newest timestamp.
fn latest_pair(series: &serde_json::Value) -> Option<(i64, f64)> {
    interleaved_pairs(series)
        .into_iter()
        .filter(|(_, v)| *v > 0.0)
        .max_by_key(|(t, _)| *t)
}

/// Latest valid price from a top-level price history, in dollars.
pub fn latest_history_price(payload: &RawPayload, kind: HistoryKind) -> Option<f64> {
    if !kind.is_price() {
        return None;
    }
    latest_pair(payload.history(kind)).map(|(_, cents)| cents / 100.0)
}
