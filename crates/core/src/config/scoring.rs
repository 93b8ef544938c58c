//! Thresholds, weights and business-rule tables for every scorer.
//!
//! Each section deserializes with per-field defaults, so a config file only needs
//! the values it overrides. [`ScoringConfig::validate`] runs once at load time;
//! scorers assume a validated config and do not re-check it.

use crate::config::error::ConfigError;
use crate::domain::recommendation::Tier;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const WEIGHT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub extraction: ExtractionConfig,
    pub velocity: VelocityConfig,
    pub stability: StabilityConfig,
    pub confidence: ConfidenceConfig,
    pub risk: RiskConfig,
    pub recommendation: RecommendationConfig,
    pub sighting: SightingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    pub multipliers: StrategyMultipliers,
    pub recent_history_max_age_hours: i64,
    pub out_of_range_confidence_cap: f64,
    pub default_max_plausible_rank: i64,
    /// Category id -> largest rank that category can plausibly report.
    pub category_max_plausible_rank: BTreeMap<i64, i64>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            multipliers: StrategyMultipliers::default(),
            recent_history_max_age_hours: 24,
            out_of_range_confidence_cap: 0.3,
            default_max_plausible_rank: 10_000_000,
            category_max_plausible_rank: BTreeMap::new(),
        }
    }
}

impl ExtractionConfig {
    pub fn max_plausible_rank(&self, category: Option<i64>) -> i64 {
        category
            .and_then(|c| self.category_max_plausible_rank.get(&c).copied())
            .unwrap_or(self.default_max_plausible_rank)
    }
}

/// Base confidence of each rank extraction strategy, in fallback order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyMultipliers {
    pub category_primary: f64,
    pub category_any: f64,
    pub legacy_array: f64,
    pub recent_history: f64,
    pub rolling_average: f64,
}

impl Default for StrategyMultipliers {
    fn default() -> Self {
        Self {
            category_primary: 1.0,
            category_any: 1.0,
            legacy_array: 0.9,
            recent_history: 0.8,
            rolling_average: 0.6,
        }
    }
}

impl StrategyMultipliers {
    fn in_order(&self) -> [f64; 5] {
        [
            self.category_primary,
            self.category_any,
            self.legacy_array,
            self.recent_history,
            self.rolling_average,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VelocityConfig {
    pub window: usize,
    pub min_points: usize,
    pub fallback_score: f64,
    pub improving_at: u8,
    pub declining_at: u8,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            window: 7,
            min_points: 4,
            fallback_score: 50.0,
            improving_at: 55,
            declining_at: 45,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StabilityConfig {
    /// Coefficient of variation that maps to a score of zero.
    pub cv_ceiling: f64,
    pub neutral_score: f64,
    pub stable_at: u8,
    pub moderate_at: u8,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            cv_ceiling: 0.5,
            neutral_score: 50.0,
            stable_at: 70,
            moderate_at: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfidenceConfig {
    pub target_points: usize,
    pub fresh_hours: f64,
    pub half_life_hours: f64,
    pub target_signal_types: usize,
    pub count_weight: f64,
    pub recency_weight: f64,
    pub signal_weight: f64,
    pub high_at: u8,
    pub medium_at: u8,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            target_points: 30,
            fresh_hours: 24.0,
            half_life_hours: 72.0,
            target_signal_types: 4,
            count_weight: 0.40,
            recency_weight: 0.35,
            signal_weight: 0.25,
            high_at: 70,
            medium_at: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskWeights {
    pub stale_inventory: f64,
    pub competition: f64,
    pub vendor_presence: f64,
    pub price_stability: f64,
    pub category: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            stale_inventory: 0.30,
            competition: 0.25,
            vendor_presence: 0.20,
            price_stability: 0.15,
            category: 0.10,
        }
    }
}

impl RiskWeights {
    pub fn sum(&self) -> f64 {
        self.stale_inventory
            + self.competition
            + self.vendor_presence
            + self.price_stability
            + self.category
    }
}

/// Stale-inventory score for products selling at least `min_monthly_sold` units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesBand {
    pub min_monthly_sold: i64,
    pub score: u8,
}

/// Stale-inventory score for ranks up to `max_rank`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankBand {
    pub max_rank: i64,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SellerBand {
    pub max_sellers: usize,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskConfig {
    pub weights: RiskWeights,
    /// Checked highest threshold first.
    pub sales_bands: Vec<SalesBand>,
    /// Checked lowest rank first.
    pub rank_bands: Vec<RankBand>,
    pub stale_fallback_score: u8,
    pub seller_bands: Vec<SellerBand>,
    /// Beyond the last seller band, one extra point per this many sellers.
    pub sellers_per_extra_point: usize,
    pub vendor_listed_score: u8,
    pub vendor_absent_score: u8,
    pub category_base_rates: BTreeMap<i64, u8>,
    pub default_category_rate: u8,
    pub low_below: u8,
    pub medium_below: u8,
    pub high_below: u8,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            sales_bands: vec![
                SalesBand { min_monthly_sold: 300, score: 10 },
                SalesBand { min_monthly_sold: 100, score: 25 },
                SalesBand { min_monthly_sold: 30, score: 45 },
                SalesBand { min_monthly_sold: 10, score: 65 },
                SalesBand { min_monthly_sold: 1, score: 85 },
            ],
            rank_bands: vec![
                RankBand { max_rank: 10_000, score: 15 },
                RankBand { max_rank: 50_000, score: 30 },
                RankBand { max_rank: 150_000, score: 50 },
                RankBand { max_rank: 500_000, score: 70 },
            ],
            stale_fallback_score: 90,
            seller_bands: vec![
                SellerBand { max_sellers: 2, score: 10 },
                SellerBand { max_sellers: 5, score: 25 },
                SellerBand { max_sellers: 15, score: 45 },
                SellerBand { max_sellers: 30, score: 65 },
            ],
            sellers_per_extra_point: 20,
            vendor_listed_score: 95,
            vendor_absent_score: 5,
            category_base_rates: BTreeMap::new(),
            default_category_rate: 50,
            low_below: 35,
            medium_below: 55,
            high_below: 75,
        }
    }
}

/// Tier granted when at least `min_passed` criteria pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRule {
    pub min_passed: u8,
    pub tier: Tier,
}

pub const RECOMMENDATION_CRITERIA: u8 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecommendationConfig {
    pub roi_floor_percent: f64,
    pub risk_ceiling: u8,
    pub roi_target_percent: f64,
    pub velocity_target: u8,
    pub risk_target: u8,
    pub stability_target: u8,
    pub breakeven_days_target: f64,
    /// Ordered by descending `min_passed`; the last rule must cover zero.
    pub tier_table: Vec<TierRule>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            roi_floor_percent: 15.0,
            risk_ceiling: 80,
            roi_target_percent: 30.0,
            velocity_target: 60,
            risk_target: 50,
            stability_target: 50,
            breakeven_days_target: 30.0,
            tier_table: vec![
                TierRule { min_passed: 6, tier: Tier::StrongBuy },
                TierRule { min_passed: 5, tier: Tier::Buy },
                TierRule { min_passed: 4, tier: Tier::Consider },
                TierRule { min_passed: 3, tier: Tier::Watch },
                TierRule { min_passed: 0, tier: Tier::Skip },
            ],
        }
    }
}

impl RecommendationConfig {
    pub fn tier_for(&self, passed: u8) -> Tier {
        self.tier_table
            .iter()
            .find(|rule| passed >= rule.min_passed)
            .map(|rule| rule.tier)
            .unwrap_or(Tier::Skip)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SightingConfig {
    pub jackpot_roi_percent: f64,
    pub revenant_gap_hours: i64,
    pub stable_min_roi_percent: f64,
    pub stable_min_priors: usize,
    pub shortlist_size: usize,
}

impl Default for SightingConfig {
    fn default() -> Self {
        Self {
            jackpot_roi_percent: 100.0,
            revenant_gap_hours: 24,
            stable_min_roi_percent: 20.0,
            stable_min_priors: 2,
            shortlist_size: 10,
        }
    }
}

impl ScoringConfig {
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let cfg = serde_json::from_str::<ScoringConfig>(text)
            .map_err(|e| ConfigError::new("parse", e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scoring config {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("failed to load scoring config {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_extraction(&self.extraction)?;
        validate_velocity(&self.velocity)?;
        validate_stability(&self.stability)?;
        validate_confidence(&self.confidence)?;
        validate_risk(&self.risk)?;
        validate_recommendation(&self.recommendation)?;
        validate_sighting(&self.sighting)?;
        Ok(())
    }
}

fn check(cond: bool, section: &'static str, detail: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if cond {
        Ok(())
    } else {
        Err(ConfigError::new(section, detail()))
    }
}

fn validate_extraction(cfg: &ExtractionConfig) -> Result<(), ConfigError> {
    const S: &str = "extraction";
    let order = cfg.multipliers.in_order();
    check(
        order.iter().all(|m| (0.0..=1.0).contains(m) && *m > 0.0),
        S,
        || format!("strategy multipliers must be in (0, 1] (got {order:?})"),
    )?;
    check(
        order.windows(2).all(|w| w[0] >= w[1]),
        S,
        || format!("strategy multipliers must not increase along the fallback order (got {order:?})"),
    )?;
    check(cfg.recent_history_max_age_hours > 0, S, || {
        "recent_history_max_age_hours must be positive".to_string()
    })?;
    check(
        (0.0..=1.0).contains(&cfg.out_of_range_confidence_cap),
        S,
        || "out_of_range_confidence_cap must be in [0, 1]".to_string(),
    )?;
    check(
        cfg.default_max_plausible_rank > 0
            && cfg.category_max_plausible_rank.values().all(|v| *v > 0),
        S,
        || "plausible rank ceilings must be positive".to_string(),
    )
}

fn validate_velocity(cfg: &VelocityConfig) -> Result<(), ConfigError> {
    const S: &str = "velocity";
    check(cfg.window >= 1, S, || "window must be >= 1".to_string())?;
    check(cfg.min_points >= 2, S, || "min_points must be >= 2".to_string())?;
    check((0.0..=100.0).contains(&cfg.fallback_score), S, || {
        "fallback_score must be in [0, 100]".to_string()
    })?;
    check(cfg.declining_at < cfg.improving_at && cfg.improving_at <= 100, S, || {
        format!(
            "declining_at ({}) must be below improving_at ({})",
            cfg.declining_at, cfg.improving_at
        )
    })
}

fn validate_stability(cfg: &StabilityConfig) -> Result<(), ConfigError> {
    const S: &str = "stability";
    check(cfg.cv_ceiling > 0.0, S, || "cv_ceiling must be positive".to_string())?;
    check((0.0..=100.0).contains(&cfg.neutral_score), S, || {
        "neutral_score must be in [0, 100]".to_string()
    })?;
    check(cfg.moderate_at < cfg.stable_at && cfg.stable_at <= 100, S, || {
        format!(
            "moderate_at ({}) must be below stable_at ({})",
            cfg.moderate_at, cfg.stable_at
        )
    })
}

fn validate_confidence(cfg: &ConfidenceConfig) -> Result<(), ConfigError> {
    const S: &str = "confidence";
    check(cfg.target_points >= 1 && cfg.target_signal_types >= 1, S, || {
        "target_points and target_signal_types must be >= 1".to_string()
    })?;
    check(cfg.fresh_hours >= 0.0 && cfg.half_life_hours > 0.0, S, || {
        "fresh_hours must be >= 0 and half_life_hours positive".to_string()
    })?;
    let weights = [cfg.count_weight, cfg.recency_weight, cfg.signal_weight];
    check(
        weights.iter().all(|w| *w >= 0.0)
            && (weights.iter().sum::<f64>() - 1.0).abs() <= WEIGHT_TOLERANCE,
        S,
        || format!("confidence weights must be non-negative and sum to 1 (got {weights:?})"),
    )?;
    check(cfg.medium_at < cfg.high_at && cfg.high_at <= 100, S, || {
        format!(
            "medium_at ({}) must be below high_at ({})",
            cfg.medium_at, cfg.high_at
        )
    })
}

fn validate_risk(cfg: &RiskConfig) -> Result<(), ConfigError> {
    const S: &str = "risk";
    let w = &cfg.weights;
    let all = [
        w.stale_inventory,
        w.competition,
        w.vendor_presence,
        w.price_stability,
        w.category,
    ];
    check(all.iter().all(|x| *x >= 0.0), S, || {
        format!("risk weights must be non-negative (got {all:?})")
    })?;
    check((w.sum() - 1.0).abs() <= WEIGHT_TOLERANCE, S, || {
        format!("risk weights must sum to 1.0 (got {})", w.sum())
    })?;

    check(
        cfg.sales_bands
            .windows(2)
            .all(|b| b[0].min_monthly_sold > b[1].min_monthly_sold),
        S,
        || "sales_bands must be ordered by descending min_monthly_sold".to_string(),
    )?;
    check(
        cfg.rank_bands.windows(2).all(|b| b[0].max_rank < b[1].max_rank),
        S,
        || "rank_bands must be ordered by ascending max_rank".to_string(),
    )?;
    check(
        cfg.seller_bands
            .windows(2)
            .all(|b| b[0].max_sellers < b[1].max_sellers),
        S,
        || "seller_bands must be ordered by ascending max_sellers".to_string(),
    )?;
    check(!cfg.seller_bands.is_empty(), S, || {
        "seller_bands must not be empty".to_string()
    })?;
    check(cfg.sellers_per_extra_point >= 1, S, || {
        "sellers_per_extra_point must be >= 1".to_string()
    })?;

    let scores = cfg
        .sales_bands
        .iter()
        .map(|b| b.score)
        .chain(cfg.rank_bands.iter().map(|b| b.score))
        .chain(cfg.seller_bands.iter().map(|b| b.score))
        .chain(cfg.category_base_rates.values().copied())
        .chain([
            cfg.stale_fallback_score,
            cfg.vendor_listed_score,
            cfg.vendor_absent_score,
            cfg.default_category_rate,
        ]);
    for score in scores {
        check(score <= 100, S, || format!("risk score {score} exceeds 100"))?;
    }

    check(
        cfg.low_below < cfg.medium_below
            && cfg.medium_below < cfg.high_below
            && cfg.high_below <= 100,
        S,
        || {
            format!(
                "level thresholds must increase (low_below={}, medium_below={}, high_below={})",
                cfg.low_below, cfg.medium_below, cfg.high_below
            )
        },
    )
}

fn validate_recommendation(cfg: &RecommendationConfig) -> Result<(), ConfigError> {
    const S: &str = "recommendation";
    check(cfg.roi_floor_percent <= cfg.roi_target_percent, S, || {
        format!(
            "roi_floor_percent ({}) must not exceed roi_target_percent ({})",
            cfg.roi_floor_percent, cfg.roi_target_percent
        )
    })?;
    check(cfg.risk_target <= cfg.risk_ceiling && cfg.risk_ceiling <= 100, S, || {
        format!(
            "risk_target ({}) must not exceed risk_ceiling ({})",
            cfg.risk_target, cfg.risk_ceiling
        )
    })?;
    check(cfg.velocity_target <= 100 && cfg.stability_target <= 100, S, || {
        "score targets must be within 0-100".to_string()
    })?;
    check(cfg.breakeven_days_target > 0.0, S, || {
        "breakeven_days_target must be positive".to_string()
    })?;

    let table = &cfg.tier_table;
    check(!table.is_empty(), S, || "tier_table must not be empty".to_string())?;
    check(
        table.iter().all(|r| r.min_passed <= RECOMMENDATION_CRITERIA),
        S,
        || format!("tier_table min_passed must be <= {RECOMMENDATION_CRITERIA}"),
    )?;
    check(
        table.iter().all(|r| r.tier != Tier::Avoid),
        S,
        || "AVOID is reserved for the vendor override".to_string(),
    )?;
    check(
        table
            .windows(2)
            .all(|w| w[0].min_passed > w[1].min_passed && w[0].tier < w[1].tier),
        S,
        || "tier_table must be monotonic: fewer passes never earn a better tier".to_string(),
    )?;
    check(
        table.last().is_some_and(|r| r.min_passed == 0),
        S,
        || "tier_table must end with a min_passed = 0 rule".to_string(),
    )
}

fn validate_sighting(cfg: &SightingConfig) -> Result<(), ConfigError> {
    const S: &str = "sighting";
    check(cfg.revenant_gap_hours > 0, S, || {
        "revenant_gap_hours must be positive".to_string()
    })?;
    check(cfg.stable_min_priors >= 1, S, || {
        "stable_min_priors must be >= 1".to_string()
    })?;
    check(cfg.stable_min_roi_percent < cfg.jackpot_roi_percent, S, || {
        format!(
            "stable_min_roi_percent ({}) must be below jackpot_roi_percent ({})",
            cfg.stable_min_roi_percent, cfg.jackpot_roi_percent
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_error(text: &str) -> ConfigError {
        let err = ScoringConfig::from_json_str(text).unwrap_err();
        err.downcast_ref::<ConfigError>()
            .cloned()
            .unwrap_or_else(|| panic!("expected ConfigError, got {err:#}"))
    }

    #[test]
    fn defaults_are_valid() {
        ScoringConfig::default().validate().unwrap();
        let cfg = ScoringConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, ScoringConfig::default());
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let cfg = ScoringConfig::from_json_str(
            r#"{"velocity": {"window": 14}, "risk": {"category_base_rates": {"283155": 30}}}"#,
        )
        .unwrap();
        assert_eq!(cfg.velocity.window, 14);
        assert_eq!(cfg.velocity.min_points, 4);
        assert_eq!(cfg.risk.category_base_rates.get(&283155), Some(&30));
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let err = config_error(r#"{"risk": {"weights": {"stale_inventory": 0.5}}}"#);
        assert_eq!(err.section, "risk");
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let err = config_error(r#"{"recommendation": {"roi_floor_percent": 40.0}}"#);
        assert_eq!(err.section, "recommendation");

        let err = config_error(r#"{"risk": {"low_below": 60}}"#);
        assert_eq!(err.section, "risk");
    }

    #[test]
    fn rejects_unknown_tier_name() {
        let err = config_error(
            r#"{"recommendation": {"tier_table": [{"min_passed": 0, "tier": "MAYBE"}]}}"#,
        );
        assert_eq!(err.section, "parse");
    }

    #[test]
    fn rejects_non_monotonic_tier_table() {
        let err = config_error(
            r#"{"recommendation": {"tier_table": [
                {"min_passed": 5, "tier": "WATCH"},
                {"min_passed": 3, "tier": "BUY"},
                {"min_passed": 0, "tier": "SKIP"}
            ]}}"#,
        );
        assert_eq!(err.section, "recommendation");
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = config_error(r#"{"velocity": {"windw": 3}}"#);
        assert_eq!(err.section, "parse");
    }

    #[test]
    fn tier_lookup_follows_table() {
        let cfg = RecommendationConfig::default();
        assert_eq!(cfg.tier_for(6), Tier::StrongBuy);
        assert_eq!(cfg.tier_for(5), Tier::Buy);
        assert_eq!(cfg.tier_for(3), Tier::Watch);
        assert_eq!(cfg.tier_for(2), Tier::Skip);
    }
}
