use crate::domain::economics::Money;
use crate::domain::snapshot::{ConditionClass, OfferSummary};
use crate::ingest::array::{interleaved_triples, to_sequence};
use crate::ingest::types::{RawOffer, RawPayload};
use std::collections::{BTreeMap, BTreeSet};

/// Live offers on a listing, partitioned by condition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedOffers {
    pub by_condition: BTreeMap<ConditionClass, OfferSummary>,
    pub total_sellers: usize,
    pub vendor_listed: bool,
}

impl GroupedOffers {
    pub fn price_by_condition(&self) -> BTreeMap<ConditionClass, Money> {
        self.by_condition
            .iter()
            .map(|(class, summary)| (*class, summary.minimum_price))
            .collect()
    }
}

#[derive(Default)]
struct Accumulator {
    minimum_price: Option<Money>,
    sellers: BTreeSet<String>,
    fulfilled: usize,
}

/// Groups offers by condition class. With a `filter`, offers in other classes
/// are dropped before anything is counted.
pub fn group_offers(payload: &RawPayload, filter: Option<&[ConditionClass]>) -> GroupedOffers {
    let mut groups: BTreeMap<ConditionClass, Accumulator> = BTreeMap::new();
    let mut all_sellers = BTreeSet::new();
    let mut vendor_listed = false;
    let mut skipped: usize = 0;

    for raw in to_sequence(&payload.offers) {
        let offer = match serde_json::from_value::<RawOffer>(raw.clone()) {
            Ok(o) => o,
            Err(err) => {
                skipped += 1;
                tracing::debug!(asin = %payload.asin, error = %err, "skipping malformed offer");
                continue;
            }
        };

        let class = ConditionClass::from_code(offer.condition);
        if let Some(allowed) = filter {
            if !allowed.contains(&class) {
                continue;
            }
        }

        let Some(total) = live_total_price(&offer) else {
            continue;
        };

        let acc = groups.entry(class).or_default();
        acc.minimum_price = Some(match acc.minimum_price {
            Some(current) => current.min(total),
            None => total,
        });
        acc.sellers.insert(offer.seller_id.clone());
        if offer.is_fba {
            acc.fulfilled += 1;
        }

        all_sellers.insert(offer.seller_id);
        vendor_listed |= offer.is_amazon;
    }

    if skipped > 0 {
        tracing::debug!(asin = %payload.asin, skipped, "offers dropped while grouping");
    }

    let by_condition = groups
        .into_iter()
        .filter_map(|(class, acc)| {
            Some((
                class,
                OfferSummary {
                    minimum_price: acc.minimum_price?,
                    seller_count: acc.sellers.len(),
                    fulfilled_by_channel_count: acc.fulfilled,
                },
            ))
        })
        .collect();

    GroupedOffers {
        by_condition,
        total_sellers: all_sellers.len(),
        vendor_listed,
    }
}

// Item price plus shipping from the newest valid point; offerCSV order is not
// guaranteed. A missing shipping value counts as free shipping.
fn live_total_price(offer: &RawOffer) -> Option<Money> {
    let (_, price, shipping) = interleaved_triples(&offer.offer_csv)
        .into_iter()
        .max_by_key(|(t, _, _)| *t)?;
    let price = Money::from_cents(price.round() as i64)?;
    let shipping = Money::from_cents(shipping.round() as i64).unwrap_or(Money::ZERO);
    Some(price.saturating_add(shipping))
}
