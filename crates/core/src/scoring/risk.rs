//! Weighted risk score.
//!
//! Five components are normalized to 0-100 independently and combined with the
//! configured weight vector. Every component is returned with its weight and
//! weighted contribution so a total can be audited after the fact.

use crate::config::scoring::RiskConfig;
use crate::domain::scores::{
    clamp_score, RiskBreakdown, RiskComponent, RiskComponentKind, RiskLevel, SignalBasis,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskInputs {
    pub current_rank: Option<i64>,
    pub monthly_sold: Option<i64>,
    pub seller_count: usize,
    pub vendor_listed: bool,
    pub stability_score: u8,
    pub category: Option<i64>,
}

pub fn score_risk(inputs: &RiskInputs, cfg: &RiskConfig) -> RiskBreakdown {
    let (stale, basis) = stale_inventory_risk(inputs, cfg);
    let raw_scores = [
        (RiskComponentKind::StaleInventory, stale, Some(basis)),
        (
            RiskComponentKind::Competition,
            competition_risk(inputs.seller_count, cfg),
            None,
        ),
        (
            RiskComponentKind::VendorPresence,
            if inputs.vendor_listed {
                cfg.vendor_listed_score as f64
            } else {
                cfg.vendor_absent_score as f64
            },
            None,
        ),
        (
            RiskComponentKind::PriceStability,
            100.0 - inputs.stability_score as f64,
            None,
        ),
        (
            RiskComponentKind::Category,
            inputs
                .category
                .and_then(|c| cfg.category_base_rates.get(&c).copied())
                .unwrap_or(cfg.default_category_rate) as f64,
            None,
        ),
    ];

    let mut components = BTreeMap::new();
    let mut weighted_sum = 0.0;
    for (kind, raw, basis) in raw_scores {
        let score = clamp_score(raw);
        let weight = weight_of(kind, cfg);
        let weighted = score as f64 * weight;
        weighted_sum += weighted;
        components.insert(
            kind,
            RiskComponent {
                score,
                weight,
                weighted,
                basis,
            },
        );
    }

    let total = clamp_score(weighted_sum);
    RiskBreakdown {
        total,
        weighted_sum,
        level: risk_level(total, cfg),
        components,
    }
}

pub fn risk_level(total: u8, cfg: &RiskConfig) -> RiskLevel {
    if total < cfg.low_below {
        RiskLevel::Low
    } else if total < cfg.medium_below {
        RiskLevel::Medium
    } else if total < cfg.high_below {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

fn weight_of(kind: RiskComponentKind, cfg: &RiskConfig) -> f64 {
    let w = &cfg.weights;
    match kind {
        RiskComponentKind::StaleInventory => w.stale_inventory,
        RiskComponentKind::Competition => w.competition,
        RiskComponentKind::VendorPresence => w.vendor_presence,
        RiskComponentKind::PriceStability => w.price_stability,
        RiskComponentKind::Category => w.category,
    }
}

// Observed monthly sales beat the rank proxy whenever the provider has them.
fn stale_inventory_risk(inputs: &RiskInputs, cfg: &RiskConfig) -> (f64, SignalBasis) {
    if let Some(sold) = inputs.monthly_sold {
        let score = cfg
            .sales_bands
            .iter()
            .find(|band| sold >= band.min_monthly_sold)
            .map(|band| band.score)
            .unwrap_or(cfg.stale_fallback_score);
        return (score as f64, SignalBasis::Real);
    }

    let score = inputs
        .current_rank
        .filter(|r| *r > 0)
        .and_then(|rank| cfg.rank_bands.iter().find(|band| rank <= band.max_rank))
        .map(|band| band.score)
        .unwrap_or(cfg.stale_fallback_score);
    (score as f64, SignalBasis::Estimated)
}

fn competition_risk(sellers: usize, cfg: &RiskConfig) -> f64 {
    if let Some(band) = cfg.seller_bands.iter().find(|b| sellers <= b.max_sellers) {
        return band.score as f64;
    }

    // Past the last band the score keeps creeping up with crowding.
    let Some(last) = cfg.seller_bands.last() else {
        return 100.0;
    };
    let extra = (sellers - last.max_sellers) / cfg.sellers_per_extra_point;
    (last.score as f64 + extra as f64).min(100.0)
}
