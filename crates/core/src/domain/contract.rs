use crate::domain::sighting::{PriorSighting, SightingCandidate, SightingMetrics};
use anyhow::{bail, ensure};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Batch file handed to the sighting classifier by the upstream job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SightingBatchFile {
    pub generated_at: DateTime<Utc>,
    pub items: Vec<SightingBatchItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SightingBatchItem {
    pub identifier: String,
    pub roi_percent: f64,
    #[serde(default)]
    pub vendor_listed: bool,
    pub current_rank: Option<i64>,
    #[serde(default)]
    pub prior_sightings: Vec<PriorSighting>,
}

impl SightingBatchFile {
    pub fn validate_and_into_candidates(self) -> anyhow::Result<Vec<SightingCandidate>> {
        let mut seen = BTreeSet::<String>::new();
        let mut out = Vec::with_capacity(self.items.len());
        for item in self.items {
            out.push(item.validate_and_into_candidate(&mut seen, self.generated_at)?);
        }
        Ok(out)
    }
}

impl SightingBatchItem {
    fn validate_and_into_candidate(
        self,
        seen: &mut BTreeSet<String>,
        generated_at: DateTime<Utc>,
    ) -> anyhow::Result<SightingCandidate> {
        let identifier = self.identifier.trim().to_string();
        ensure!(!identifier.is_empty(), "identifier must be non-empty");
        ensure!(
            seen.insert(identifier.clone()),
            "duplicate identifier: {identifier}"
        );
        ensure!(
            self.roi_percent.is_finite(),
            "roi_percent must be finite for {identifier}"
        );

        for prior in &self.prior_sightings {
            if prior.seen_at > generated_at {
                bail!(
                    "prior sighting of {identifier} at {} is after the batch time {generated_at}",
                    prior.seen_at
                );
            }
        }

        let mut prior_sightings = self.prior_sightings;
        prior_sightings.sort_by_key(|p| p.seen_at);

        Ok(SightingCandidate {
            identifier,
            metrics: SightingMetrics {
                roi_percent: self.roi_percent,
                vendor_listed: self.vendor_listed,
                rank_valid: self.current_rank.is_some_and(|r| r > 0),
            },
            prior_sightings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch(items: serde_json::Value) -> SightingBatchFile {
        serde_json::from_value(json!({
            "generated_at": "2026-10-19T12:00:00Z",
            "items": items,
        }))
        .unwrap()
    }

    #[test]
    fn accepts_valid_items_and_sorts_priors() {
        let b = batch(json!([
            {
                "identifier": " B0001 ",
                "roi_percent": 42.0,
                "current_rank": 1200,
                "prior_sightings": [
                    {"seen_at": "2026-10-18T12:00:00Z"},
                    {"seen_at": "2026-10-17T12:00:00Z", "roi_percent": 35.0}
                ]
            }
        ]));
        let out = b.validate_and_into_candidates().unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].identifier, "B0001");
        assert!(out[0].metrics.rank_valid);
        assert!(!out[0].metrics.vendor_listed);
        assert!(out[0].prior_sightings[0].seen_at < out[0].prior_sightings[1].seen_at);
    }

    #[test]
    fn rejects_duplicates_and_future_priors() {
        let dup = batch(json!([
            {"identifier": "A", "roi_percent": 1.0, "current_rank": 1},
            {"identifier": "A", "roi_percent": 2.0, "current_rank": 1}
        ]));
        assert!(dup.validate_and_into_candidates().is_err());

        let future = batch(json!([
            {
                "identifier": "A",
                "roi_percent": 1.0,
                "current_rank": 1,
                "prior_sightings": [{"seen_at": "2026-10-20T00:00:00Z"}]
            }
        ]));
        assert!(future.validate_and_into_candidates().is_err());
    }

    #[test]
    fn missing_rank_is_invalid_not_an_error() {
        let b = batch(json!([{"identifier": "A", "roi_percent": 5.0, "current_rank": null}]));
        let out = b.validate_and_into_candidates().unwrap();
        assert!(!out[0].metrics.rank_valid);
    }
}
