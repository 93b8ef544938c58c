use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SightingClassification {
    Jackpot,
    Stable,
    Revenant,
    Fluke,
    Reject,
}

impl SightingClassification {
    pub const ALL: [SightingClassification; 5] = [
        SightingClassification::Jackpot,
        SightingClassification::Stable,
        SightingClassification::Revenant,
        SightingClassification::Fluke,
        SightingClassification::Reject,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SightingClassification::Jackpot => "JACKPOT",
            SightingClassification::Stable => "STABLE",
            SightingClassification::Revenant => "REVENANT",
            SightingClassification::Fluke => "FLUKE",
            SightingClassification::Reject => "REJECT",
        }
    }

    pub fn is_shortlistable(self) -> bool {
        !matches!(
            self,
            SightingClassification::Reject | SightingClassification::Fluke
        )
    }
}

/// What today's run measured for a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SightingMetrics {
    pub roi_percent: f64,
    pub vendor_listed: bool,
    pub rank_valid: bool,
}

/// An earlier run in which the product qualified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorSighting {
    pub seen_at: DateTime<Utc>,
    #[serde(default)]
    pub roi_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightingCandidate {
    pub identifier: String,
    pub metrics: SightingMetrics,
    pub prior_sightings: Vec<PriorSighting>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedSighting {
    pub identifier: String,
    pub classification: SightingClassification,
    pub roi_percent: f64,
    pub prior_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchClassification {
    pub results: Vec<ClassifiedSighting>,
    pub counts: BTreeMap<SightingClassification, usize>,
    pub shortlist: Vec<ClassifiedSighting>,
    pub summary: String,
}
