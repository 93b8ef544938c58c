use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Qualitative label attached to a trend score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreLevel {
    Improving,
    Flat,
    Declining,
    Stable,
    Moderate,
    Volatile,
    High,
    Medium,
    Low,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub raw: f64,
    pub normalized: u8,
    pub level: ScoreLevel,
    pub notes: String,
}

impl ScoreResult {
    pub fn new(raw: f64, normalized: f64, level: ScoreLevel, notes: impl Into<String>) -> Self {
        Self {
            raw,
            normalized: clamp_score(normalized),
            level,
            notes: notes.into(),
        }
    }
}

/// Rounds onto the 0-100 scale. Values outside it signal an upstream bug.
pub fn clamp_score(value: f64) -> u8 {
    if !value.is_finite() {
        tracing::warn!(value, "non-finite score clamped to 0");
        return 0;
    }
    if !(0.0..=100.0).contains(&value) {
        tracing::warn!(value, "score outside 0-100 clamped");
    }
    value.round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskComponentKind {
    StaleInventory,
    Competition,
    VendorPresence,
    PriceStability,
    Category,
}

/// Whether a component came from an observed signal or a proxy for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalBasis {
    Real,
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskComponent {
    pub score: u8,
    pub weight: f64,
    pub weighted: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis: Option<SignalBasis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub total: u8,
    pub weighted_sum: f64,
    pub level: RiskLevel,
    pub components: BTreeMap<RiskComponentKind, RiskComponent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_score_rounds_and_bounds() {
        assert_eq!(clamp_score(58.7), 59);
        assert_eq!(clamp_score(-3.0), 0);
        assert_eq!(clamp_score(140.0), 100);
        assert_eq!(clamp_score(f64::NAN), 0);
    }

    #[test]
    fn levels_serialize_screaming() {
        let s = serde_json::to_string(&ScoreLevel::Improving).unwrap();
        assert_eq!(s, "\"IMPROVING\"");
        let s = serde_json::to_string(&RiskComponentKind::StaleInventory).unwrap();
        assert_eq!(s, "\"stale_inventory\"");
    }
}
