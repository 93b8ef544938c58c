//! Rule-based buy/avoid decision.
//!
//! Hard overrides are checked first and end the evaluation. Otherwise six
//! criteria are counted and the count is mapped through the configured tier
//! table. The output depends on nothing but the arguments.

use crate::config::scoring::{RecommendationConfig, RECOMMENDATION_CRITERIA};
use crate::domain::economics::UnitEconomics;
use crate::domain::recommendation::{Recommendation, Tier};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationInput {
    pub net_roi_percent: f64,
    pub velocity_score: u8,
    pub risk_score: u8,
    pub stability_score: u8,
    pub vendor_on_listing: bool,
    pub vendor_has_winning_offer: bool,
    pub economics: UnitEconomics,
    pub seller_count: Option<usize>,
    pub breakeven_days: Option<f64>,
}

struct Criterion {
    name: &'static str,
    passed: bool,
}

pub fn recommend(input: &RecommendationInput, cfg: &RecommendationConfig) -> Recommendation {
    if let Some(rec) = hard_override(input, cfg) {
        return rec;
    }

    let criteria = evaluate_criteria(input, cfg);
    let passed = criteria.iter().filter(|c| c.passed).count() as u8;
    let tier = cfg.tier_for(passed);

    let met: Vec<&str> = criteria.iter().filter(|c| c.passed).map(|c| c.name).collect();
    let missed: Vec<&str> = criteria.iter().filter(|c| !c.passed).map(|c| c.name).collect();
    let mut reason = format!("Passed {passed}/{RECOMMENDATION_CRITERIA} criteria");
    if !met.is_empty() {
        reason.push_str(&format!("; met: {}", met.join(", ")));
    }
    if !missed.is_empty() {
        reason.push_str(&format!("; missed: {}", missed.join(", ")));
    }

    Recommendation {
        tier,
        confidence_percent: (passed as f64 / RECOMMENDATION_CRITERIA as f64 * 100.0).round() as u8,
        criteria_passed: passed,
        criteria_total: RECOMMENDATION_CRITERIA,
        reason,
        next_steps: next_steps(tier, input, cfg, &missed),
    }
}

fn hard_override(input: &RecommendationInput, cfg: &RecommendationConfig) -> Option<Recommendation> {
    let (tier, reason, steps) = if input.vendor_has_winning_offer {
        (
            Tier::Avoid,
            "Platform retailer holds the winning offer".to_string(),
            vec![
                "Do not source this product".to_string(),
                "Re-check only if the platform drops off the listing".to_string(),
            ],
        )
    } else if input.net_roi_percent < cfg.roi_floor_percent {
        (
            Tier::Skip,
            format!(
                "ROI {:.1}% is below the {:.1}% floor",
                input.net_roi_percent, cfg.roi_floor_percent
            ),
            vec![
                format!(
                    "Only revisit at a buy cost of {} or less",
                    input.economics.max_buy_cost_for(cfg.roi_floor_percent)
                ),
            ],
        )
    } else if input.risk_score > cfg.risk_ceiling {
        (
            Tier::Skip,
            format!(
                "Risk {} exceeds the {} ceiling",
                input.risk_score, cfg.risk_ceiling
            ),
            vec!["Skip; risk outweighs the margin".to_string()],
        )
    } else {
        return None;
    };

    Some(Recommendation {
        tier,
        confidence_percent: 100,
        criteria_passed: 0,
        criteria_total: RECOMMENDATION_CRITERIA,
        reason,
        next_steps: steps,
    })
}

fn evaluate_criteria(input: &RecommendationInput, cfg: &RecommendationConfig) -> [Criterion; 6] {
    [
        Criterion {
            name: "roi",
            passed: input.net_roi_percent >= cfg.roi_target_percent,
        },
        Criterion {
            name: "velocity",
            passed: input.velocity_score >= cfg.velocity_target,
        },
        Criterion {
            name: "risk",
            passed: input.risk_score <= cfg.risk_target,
        },
        Criterion {
            name: "stability",
            passed: input.stability_score >= cfg.stability_target,
        },
        // Unknown breakeven is not a pass.
        Criterion {
            name: "breakeven",
            passed: input
                .breakeven_days
                .is_some_and(|d| d <= cfg.breakeven_days_target),
        },
        Criterion {
            name: "no_vendor",
            passed: !input.vendor_on_listing,
        },
    ]
}

fn next_steps(
    tier: Tier,
    input: &RecommendationInput,
    cfg: &RecommendationConfig,
    missed: &[&str],
) -> Vec<String> {
    let max_cost = input.economics.max_buy_cost_for(cfg.roi_target_percent);
    let mut steps = match tier {
        Tier::StrongBuy | Tier::Buy => vec![
            format!(
                "Source at {} or less to keep ROI at {:.0}%",
                max_cost, cfg.roi_target_percent
            ),
            format!(
                "Set the repricer floor at {}",
                input.economics.buy_cost.saturating_add(input.economics.fees)
            ),
        ],
        Tier::Consider => vec![
            "Start with a small test quantity".to_string(),
            format!("Target a buy cost of {max_cost} or less"),
        ],
        Tier::Watch => vec!["Add to the watch list and re-check tomorrow".to_string()],
        Tier::Skip | Tier::Avoid => vec!["Skip for now".to_string()],
    };

    if matches!(tier, Tier::StrongBuy | Tier::Buy | Tier::Consider) {
        if let Some(sellers) = input.seller_count.filter(|n| *n > 15) {
            steps.push(format!("Expect price pressure from {sellers} competing sellers"));
        }
        if missed.contains(&"breakeven") {
            steps.push("Confirm sell-through speed before a large order".to_string());
        }
    }
    if missed.contains(&"no_vendor") && tier != Tier::Skip {
        steps.push("Watch for the platform retailer winning the offer".to_string());
    }
    steps
}
