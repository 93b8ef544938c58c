use crate::domain::economics::Money;
use crate::ingest::extract::ExtractionStrategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket used to group competing offers. Declared order is best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionClass {
    New,
    LikeNew,
    VeryGood,
    Good,
    Acceptable,
    Refurbished,
    Unknown,
}

impl ConditionClass {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => ConditionClass::New,
            2 => ConditionClass::LikeNew,
            3 => ConditionClass::VeryGood,
            4 => ConditionClass::Good,
            5 => ConditionClass::Acceptable,
            6 => ConditionClass::Refurbished,
            _ => ConditionClass::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferSummary {
    pub minimum_price: Money,
    pub seller_count: usize,
    pub fulfilled_by_channel_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedSnapshot {
    pub identifier: String,
    pub title: Option<String>,
    pub primary_category: Option<i64>,
    pub price_by_condition: BTreeMap<ConditionClass, Money>,
    pub current_rank: Option<i64>,
    pub rank_confidence: f64,
    pub rank_provenance: Option<ExtractionStrategy>,
    pub offers_by_condition: BTreeMap<ConditionClass, OfferSummary>,
    pub total_sellers: usize,
    pub vendor_listed: bool,
    pub vendor_has_winning_offer: bool,
    pub monthly_sold: Option<i64>,
}

impl NormalizedSnapshot {
    pub fn lowest_new_price(&self) -> Option<Money> {
        self.price_by_condition.get(&ConditionClass::New).copied()
    }

    pub fn rank_is_valid(&self) -> bool {
        self.current_rank.is_some_and(|r| r > 0)
    }
}
