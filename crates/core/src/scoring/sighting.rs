use crate::config::scoring::SightingConfig;
use crate::domain::sighting::{
    BatchClassification, ClassifiedSighting, PriorSighting, SightingCandidate,
    SightingClassification, SightingMetrics,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Classifies today's sighting of a product against its earlier sightings.
///
/// Rules are evaluated in priority order and the first match wins, so REJECT and
/// FLUKE always dominate the positive classes.
pub fn classify_sighting(
    metrics: &SightingMetrics,
    priors: &[PriorSighting],
    now: DateTime<Utc>,
    cfg: &SightingConfig,
) -> SightingClassification {
    if metrics.vendor_listed || metrics.roi_percent < 0.0 || !metrics.rank_valid {
        return SightingClassification::Reject;
    }

    let Some(last_seen) = priors.iter().map(|p| p.seen_at).max() else {
        return SightingClassification::Fluke;
    };

    if metrics.roi_percent > cfg.jackpot_roi_percent {
        return SightingClassification::Jackpot;
    }

    if now - last_seen > Duration::hours(cfg.revenant_gap_hours) {
        return SightingClassification::Revenant;
    }

    if priors.len() >= cfg.stable_min_priors && metrics.roi_percent >= cfg.stable_min_roi_percent {
        return SightingClassification::Stable;
    }

    SightingClassification::Fluke
}

pub fn classify_batch(
    candidates: &[SightingCandidate],
    now: DateTime<Utc>,
    cfg: &SightingConfig,
) -> BatchClassification {
    let results: Vec<ClassifiedSighting> = candidates
        .iter()
        .map(|c| ClassifiedSighting {
            identifier: c.identifier.clone(),
            classification: classify_sighting(&c.metrics, &c.prior_sightings, now, cfg),
            roi_percent: c.metrics.roi_percent,
            prior_count: c.prior_sightings.len(),
        })
        .collect();

    let mut counts: BTreeMap<SightingClassification, usize> = SightingClassification::ALL
        .iter()
        .map(|class| (*class, 0))
        .collect();
    for r in &results {
        *counts.entry(r.classification).or_default() += 1;
    }

    let mut shortlist: Vec<ClassifiedSighting> = results
        .iter()
        .filter(|r| r.classification.is_shortlistable())
        .cloned()
        .collect();
    shortlist.sort_by(|a, b| {
        b.roi_percent
            .partial_cmp(&a.roi_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    shortlist.truncate(cfg.shortlist_size);

    let summary = summarize(results.len(), &counts, &shortlist);
    tracing::info!(
        total = results.len(),
        shortlisted = shortlist.len(),
        "classified sighting batch"
    );

    BatchClassification {
        results,
        counts,
        shortlist,
        summary,
    }
}

fn summarize(
    total: usize,
    counts: &BTreeMap<SightingClassification, usize>,
    shortlist: &[ClassifiedSighting],
) -> String {
    let parts: Vec<String> = SightingClassification::ALL
        .iter()
        .map(|class| format!("{} {}", counts.get(class).copied().unwrap_or(0), class.label()))
        .collect();
    let top = match shortlist.first() {
        Some(best) => format!("; top {} at {:.1}% ROI", best.identifier, best.roi_percent),
        None => String::new(),
    };
    format!("{total} products: {}{top}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn metrics(roi: f64) -> SightingMetrics {
        SightingMetrics {
            roi_percent: roi,
            vendor_listed: false,
            rank_valid: true,
        }
    }

    fn seen(hours_ago: i64) -> PriorSighting {
        PriorSighting {
            seen_at: now() - Duration::hours(hours_ago),
            roi_percent: None,
        }
    }

    fn classify(m: SightingMetrics, priors: &[PriorSighting]) -> SightingClassification {
        classify_sighting(&m, priors, now(), &SightingConfig::default())
    }

    #[test]
    fn stable_then_revenant_after_gap() {
        assert_eq!(
            classify(metrics(40.0), &[seen(16), seen(6)]),
            SightingClassification::Stable
        );
        assert_eq!(
            classify(metrics(40.0), &[seen(40), seen(30)]),
            SightingClassification::Revenant
        );
    }

    #[test]
    fn reject_dominates_extreme_roi() {
        let m = SightingMetrics {
            vendor_listed: true,
            ..metrics(10_000.0)
        };
        assert_eq!(classify(m, &[seen(2), seen(5)]), SightingClassification::Reject);
        assert_eq!(classify(metrics(-1.0), &[seen(2)]), SightingClassification::Reject);
        let m = SightingMetrics {
            rank_valid: false,
            ..metrics(50.0)
        };
        assert_eq!(classify(m, &[seen(2)]), SightingClassification::Reject);
    }

    #[test]
    fn no_priors_is_never_positive() {
        for roi in [0.0, 40.0, 150.0, 10_000.0] {
            assert_eq!(classify(metrics(roi), &[]), SightingClassification::Fluke);
        }
    }

    #[test]
    fn jackpot_needs_a_prior_and_beats_revenant() {
        assert_eq!(classify(metrics(150.0), &[seen(2)]), SightingClassification::Jackpot);
        assert_eq!(classify(metrics(150.0), &[seen(72)]), SightingClassification::Jackpot);
    }

    #[test]
    fn single_recent_prior_or_low_roi_is_fluke() {
        assert_eq!(classify(metrics(40.0), &[seen(3)]), SightingClassification::Fluke);
        assert_eq!(
            classify(metrics(10.0), &[seen(3), seen(8)]),
            SightingClassification::Fluke
        );
    }

    #[test]
    fn batch_counts_shortlist_and_summary() {
        let candidates = vec![
            SightingCandidate {
                identifier: "B".to_string(),
                metrics: metrics(40.0),
                prior_sightings: vec![seen(16), seen(6)],
            },
            SightingCandidate {
                identifier: "A".to_string(),
                metrics: metrics(150.0),
                prior_sightings: vec![seen(5)],
            },
            SightingCandidate {
                identifier: "C".to_string(),
                metrics: metrics(300.0),
                prior_sightings: vec![],
            },
            SightingCandidate {
                identifier: "D".to_string(),
                metrics: SightingMetrics {
                    vendor_listed: true,
                    ..metrics(90.0)
                },
                prior_sightings: vec![seen(5)],
            },
        ];

        let mut cfg = SightingConfig::default();
        let out = classify_batch(&candidates, now(), &cfg);
        assert_eq!(out.counts[&SightingClassification::Stable], 1);
        assert_eq!(out.counts[&SightingClassification::Jackpot], 1);
        assert_eq!(out.counts[&SightingClassification::Fluke], 1);
        assert_eq!(out.counts[&SightingClassification::Reject], 1);
        assert_eq!(out.counts[&SightingClassification::Revenant], 0);

        let ids: Vec<&str> = out.shortlist.iter().map(|s| s.identifier.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(
            out.summary,
            "4 products: 1 JACKPOT, 1 STABLE, 0 REVENANT, 1 FLUKE, 1 REJECT; top A at 150.0% ROI"
        );

        cfg.shortlist_size = 1;
        let out = classify_batch(&candidates, now(), &cfg);
        assert_eq!(out.shortlist.len(), 1);
    }
}
