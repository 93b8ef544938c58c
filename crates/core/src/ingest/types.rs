use serde::{Deserialize, Serialize};
use serde_json::Value;

static MISSING: Value = Value::Null;

/// Index of the sales rank in `stats.current` / `stats.avg30` and in `csv`.
pub const RANK_INDEX: usize = 3;

/// Histories read out of the top-level `csv` array. Other slots (platform and
/// used prices) are not scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    NewPrice,
    SalesRank,
}

impl HistoryKind {
    pub fn index(self) -> usize {
        match self {
            HistoryKind::NewPrice => 1,
            HistoryKind::SalesRank => RANK_INDEX,
        }
    }

    pub fn is_price(self) -> bool {
        !matches!(self, HistoryKind::SalesRank)
    }
}

/// Provider record for one product.
///
/// Everything whose shape the provider has been seen to vary is kept as a raw
/// `Value` and read through [`crate::ingest::array`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPayload {
    pub asin: String,
    pub title: Option<String>,
    pub root_category: Option<i64>,
    /// Declared primary category for `sales_ranks`.
    pub sales_rank_reference: Option<i64>,
    /// Category id (as a string key) -> interleaved `[t, rank, ...]` series.
    pub sales_ranks: Value,
    pub stats: Value,
    pub csv: Value,
    pub offers: Value,
    pub monthly_sold: Option<i64>,
}

impl RawPayload {
    pub fn history(&self, kind: HistoryKind) -> &Value {
        self.csv.get(kind.index()).unwrap_or(&MISSING)
    }

    pub fn stats_field(&self, key: &str) -> &Value {
        self.stats.get(key).unwrap_or(&MISSING)
    }

    pub fn primary_category(&self) -> Option<i64> {
        self.sales_rank_reference.or(self.root_category)
    }

    pub fn buy_box_is_vendor(&self) -> bool {
        self.stats_field("buyBoxIsAmazon").as_bool().unwrap_or(false)
    }
}

/// One seller's listing as it appears in `offers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOffer {
    pub seller_id: String,
    pub condition: i64,
    #[serde(rename = "isFBA")]
    pub is_fba: bool,
    pub is_amazon: bool,
    /// Interleaved `[t, price, shipping, ...]` in minor currency units.
    #[serde(rename = "offerCSV")]
    pub offer_csv: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_expected_shape_with_missing_fields() {
        let v = json!({
            "asin": "B000TEST01",
            "title": "Widget",
            "salesRankReference": 1055398,
            "salesRanks": {"1055398": [7000000, 15000]},
            "stats": {"current": [-1, 2599, -1, 15321], "buyBoxIsAmazon": true},
            "csv": [null, [7000000, 2599], null, [7000000, 15321]],
            "offers": [{"sellerId": "S1", "condition": 1, "isFBA": true, "offerCSV": [7000000, 2599, 0]}]
        });

        let parsed: RawPayload = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.asin, "B000TEST01");
        assert_eq!(parsed.primary_category(), Some(1055398));
        assert!(parsed.buy_box_is_vendor());
        assert!(parsed.history(HistoryKind::NewPrice).is_array());
        assert!(parsed.history(HistoryKind::SalesRank).is_array());
        assert_eq!(parsed.monthly_sold, None);

        let offer: RawOffer = serde_json::from_value(parsed.offers[0].clone()).unwrap();
        assert!(offer.is_fba);
        assert!(!offer.is_amazon);
    }

    #[test]
    fn empty_object_is_a_valid_payload() {
        let parsed: RawPayload = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.asin.is_empty());
        assert!(parsed.history(HistoryKind::NewPrice).is_null());
        assert!(!parsed.buy_box_is_vendor());
    }
}
