//! One product, end to end: payload in, report out.

use crate::config::ScoringConfig;
use crate::domain::economics::{Money, UnitEconomics};
use crate::domain::recommendation::Recommendation;
use crate::domain::scores::{RiskBreakdown, ScoreResult};
use crate::domain::sighting::{PriorSighting, SightingClassification, SightingMetrics};
use crate::domain::snapshot::NormalizedSnapshot;
use crate::ingest::extract::latest_history_price;
use crate::ingest::normalize::{
    history_series, normalize_payload, signal_types_present, RESALE_CONDITIONS,
};
use crate::ingest::types::{HistoryKind, RawPayload};
use crate::scoring::confidence::score_confidence;
use crate::scoring::recommendation::{recommend, RecommendationInput};
use crate::scoring::risk::{score_risk, RiskInputs};
use crate::scoring::sighting::classify_sighting;
use crate::scoring::stability::score_stability;
use crate::scoring::velocity::{score_velocity, Direction};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    pub buy_cost: Money,
    pub fees: Money,
    /// Overrides the sale price read from the payload.
    pub sale_price: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductReport {
    pub snapshot: NormalizedSnapshot,
    pub economics: UnitEconomics,
    pub roi_percent: f64,
    pub breakeven_days: Option<f64>,
    pub velocity: ScoreResult,
    pub stability: ScoreResult,
    pub confidence: ScoreResult,
    pub risk: RiskBreakdown,
    pub recommendation: Recommendation,
    pub sighting: SightingClassification,
}

pub fn analyze_product(
    payload: &RawPayload,
    costs: &CostInputs,
    prior_sightings: &[PriorSighting],
    cfg: &ScoringConfig,
    now: DateTime<Utc>,
) -> anyhow::Result<ProductReport> {
    let snapshot = normalize_payload(payload, &cfg.extraction, Some(&RESALE_CONDITIONS), now);

    let sale_price = resolve_sale_price(payload, &snapshot, costs).with_context(|| {
        format!(
            "no sale price available for {}: no override, no live new offer, no price history",
            snapshot.identifier
        )
    })?;
    let economics = UnitEconomics::try_new(costs.buy_cost, sale_price, costs.fees)?;
    let roi_percent = economics.roi_percent();

    let rank_history = history_series(payload, HistoryKind::SalesRank);
    let price_history = history_series(payload, HistoryKind::NewPrice);

    let velocity = score_velocity(&rank_history, Direction::LowerIsBetter, &cfg.velocity);
    let stability = score_stability(&price_history, &cfg.stability);
    let confidence = score_confidence(
        &rank_history,
        signal_types_present(payload, &snapshot),
        now,
        &cfg.confidence,
    );

    let risk = score_risk(
        &RiskInputs {
            current_rank: snapshot.current_rank,
            monthly_sold: snapshot.monthly_sold,
            seller_count: snapshot.total_sellers,
            vendor_listed: snapshot.vendor_listed,
            stability_score: stability.normalized,
            category: snapshot.primary_category,
        },
        &cfg.risk,
    );

    let breakeven_days = estimate_breakeven_days(&snapshot);
    let recommendation = recommend(
        &RecommendationInput {
            net_roi_percent: roi_percent,
            velocity_score: velocity.normalized,
            risk_score: risk.total,
            stability_score: stability.normalized,
            vendor_on_listing: snapshot.vendor_listed,
            vendor_has_winning_offer: snapshot.vendor_has_winning_offer,
            economics,
            seller_count: Some(snapshot.total_sellers),
            breakeven_days,
        },
        &cfg.recommendation,
    );

    let sighting = classify_sighting(
        &SightingMetrics {
            roi_percent,
            vendor_listed: snapshot.vendor_listed,
            rank_valid: snapshot.rank_is_valid(),
        },
        prior_sightings,
        now,
        &cfg.sighting,
    );

    tracing::info!(
        asin = %snapshot.identifier,
        tier = ?recommendation.tier,
        risk = risk.total,
        roi_percent,
        rank = ?snapshot.current_rank,
        rank_source = snapshot.rank_provenance.map(|s| s.tag()).unwrap_or("none"),
        sighting = sighting.label(),
        "analyzed product"
    );

    Ok(ProductReport {
        snapshot,
        economics,
        roi_percent,
        breakeven_days,
        velocity,
        stability,
        confidence,
        risk,
        recommendation,
        sighting,
    })
}

fn resolve_sale_price(
    payload: &RawPayload,
    snapshot: &NormalizedSnapshot,
    costs: &CostInputs,
) -> Option<Money> {
    costs
        .sale_price
        .or_else(|| snapshot.lowest_new_price())
        .or_else(|| {
            latest_history_price(payload, HistoryKind::NewPrice).and_then(Money::from_dollars)
        })
}

/// Days until one unit sells, assuming our share of monthly sales is even
/// across every seller on the listing plus us.
fn estimate_breakeven_days(snapshot: &NormalizedSnapshot) -> Option<f64> {
    let sold = snapshot.monthly_sold.filter(|n| *n > 0)? as f64;
    let our_share = sold / (snapshot.total_sellers + 1) as f64;
    Some(30.0 / our_share)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::Tier;
    use crate::time::to_vendor_minutes;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn minutes(days_ago: i64) -> i64 {
        to_vendor_minutes(now() - Duration::days(days_ago))
    }

    fn payload(buy_box_is_vendor: bool) -> RawPayload {
        serde_json::from_value(json!({
            "asin": "B0PIPE",
            "title": "Pipeline widget",
            "salesRankReference": 7,
            "salesRanks": {"7": [minutes(1), 4200]},
            "stats": {"buyBoxIsAmazon": buy_box_is_vendor},
            "csv": [
                null,
                [minutes(8), 2500, minutes(6), 2500, minutes(4), 2500, minutes(2), 2500],
                null,
                // Deliberately out of order.
                [minutes(2), 4500, minutes(8), 9000, minutes(4), 6000, minutes(6), 8000]
            ],
            "offers": [
                {"sellerId": "S1", "condition": 1, "isFBA": true, "offerCSV": [minutes(1), 2500, 0]},
                {"sellerId": "S2", "condition": 1, "offerCSV": [minutes(1), 2600, 0]}
            ],
            "monthlySold": 300
        }))
        .unwrap()
    }

    fn costs() -> CostInputs {
        CostInputs {
            buy_cost: Money::from_dollars(12.0).unwrap(),
            fees: Money::from_dollars(5.0).unwrap(),
            sale_price: None,
        }
    }

    #[test]
    fn full_report_for_healthy_listing() {
        let priors = [
            PriorSighting { seen_at: now() - Duration::hours(16), roi_percent: Some(60.0) },
            PriorSighting { seen_at: now() - Duration::hours(6), roi_percent: Some(62.0) },
        ];
        let report =
            analyze_product(&payload(false), &costs(), &priors, &ScoringConfig::default(), now())
                .unwrap();

        assert_eq!(report.snapshot.current_rank, Some(4200));
        assert_eq!(report.economics.sale_price, Money::from_dollars(25.0).unwrap());
        // (25 - 5 - 12) / 12
        assert!((report.roi_percent - 66.666_666).abs() < 1e-3);
        assert!(report.velocity.normalized > 50);
        assert_eq!(report.stability.normalized, 100);
        // 300 sales over 3 sellers -> one unit every 0.3 days.
        assert!((report.breakeven_days.unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(report.recommendation.tier, Tier::StrongBuy);
        assert_eq!(report.sighting, SightingClassification::Stable);
    }

    #[test]
    fn vendor_winning_offer_forces_avoid() {
        let report =
            analyze_product(&payload(true), &costs(), &[], &ScoringConfig::default(), now()).unwrap();
        assert_eq!(report.recommendation.tier, Tier::Avoid);
        assert_eq!(report.sighting, SightingClassification::Fluke);
    }

    #[test]
    fn missing_every_price_source_is_an_error() {
        let bare: RawPayload = serde_json::from_value(json!({"asin": "B0BARE"})).unwrap();
        let err = analyze_product(&bare, &costs(), &[], &ScoringConfig::default(), now());
        assert!(err.is_err());

        let with_override = CostInputs {
            sale_price: Some(Money::from_dollars(30.0).unwrap()),
            ..costs()
        };
        let report =
            analyze_product(&bare, &with_override, &[], &ScoringConfig::default(), now()).unwrap();
        assert_eq!(report.snapshot.current_rank, None);
        assert_eq!(report.snapshot.rank_confidence, 0.0);
        assert_eq!(report.sighting, SightingClassification::Reject);
    }
}
