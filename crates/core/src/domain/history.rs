use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Chronologically ascending history. The only way in is through [`HistorySeries::new`],
/// which sorts, so trend scorers never see out-of-order input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HistorySeries(Vec<HistoryPoint>);

impl HistorySeries {
    pub fn new(mut points: Vec<HistoryPoint>) -> Self {
        // Stable, so equal timestamps keep provider order.
        points.sort_by_key(|p| p.timestamp);
        Self(points)
    }

    pub fn points(&self) -> &[HistoryPoint] {
        &self.0
    }

    pub fn values(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.0.last()
    }
}
