use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    StrongBuy,
    Buy,
    Consider,
    Watch,
    Skip,
    Avoid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub tier: Tier,
    pub confidence_percent: u8,
    pub criteria_passed: u8,
    pub criteria_total: u8,
    pub reason: String,
    pub next_steps: Vec<String>,
}
