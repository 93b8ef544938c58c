use crate::config::scoring::ExtractionConfig;
use crate::domain::history::{HistoryPoint, HistorySeries};
use crate::domain::snapshot::{ConditionClass, NormalizedSnapshot};
use crate::ingest::array::interleaved_pairs;
use crate::ingest::extract::extract_current_rank;
use crate::ingest::offers::group_offers;
use crate::ingest::types::{HistoryKind, RawPayload};
use crate::time::to_calendar_time;
use chrono::{DateTime, Utc};

/// Conditions that compete with a new-or-like-new resale.
pub const RESALE_CONDITIONS: [ConditionClass; 4] = [
    ConditionClass::New,
    ConditionClass::LikeNew,
    ConditionClass::VeryGood,
    ConditionClass::Good,
];

pub fn normalize_payload(
    payload: &RawPayload,
    cfg: &ExtractionConfig,
    condition_filter: Option<&[ConditionClass]>,
    now: DateTime<Utc>,
) -> NormalizedSnapshot {
    let rank = extract_current_rank(payload, cfg, now);
    let offers = group_offers(payload, condition_filter);

    NormalizedSnapshot {
        identifier: payload.asin.trim().to_string(),
        title: payload
            .title
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        primary_category: payload.primary_category(),
        price_by_condition: offers.price_by_condition(),
        current_rank: rank.value,
        rank_confidence: rank.confidence,
        rank_provenance: rank.provenance,
        offers_by_condition: offers.by_condition,
        total_sellers: offers.total_sellers,
        vendor_listed: offers.vendor_listed,
        vendor_has_winning_offer: payload.buy_box_is_vendor(),
        monthly_sold: payload.monthly_sold.filter(|n| *n >= 0),
    }
}

/// Decodes one top-level history into an ascending series. Prices come out in
/// dollars; points with a sentinel timestamp or value are dropped.
pub fn history_series(payload: &RawPayload, kind: HistoryKind) -> HistorySeries {
    let scale = if kind.is_price() { 100.0 } else { 1.0 };
    let points = interleaved_pairs(payload.history(kind))
        .into_iter()
        .filter(|(_, v)| *v >= 0.0)
        .filter_map(|(minutes, v)| {
            Some(HistoryPoint {
                timestamp: to_calendar_time(minutes)?,
                value: v / scale,
            })
        })
        .collect();
    HistorySeries::new(points)
}

/// Number of independent signal types the payload carries.
pub fn signal_types_present(payload: &RawPayload, snapshot: &NormalizedSnapshot) -> usize {
    let rank = !history_series(payload, HistoryKind::SalesRank).is_empty()
        || snapshot.current_rank.is_some();
    let price = !history_series(payload, HistoryKind::NewPrice).is_empty();
    let offers = !snapshot.offers_by_condition.is_empty();
    let sales = snapshot.monthly_sold.is_some();
    [rank, price, offers, sales].into_iter().filter(|x| *x).count()
}
