//! Append-only per-year snapshots used for charting and scoring.

use serde::{Deserialize, Serialize};

use crate::state::{MetricKey, Metrics};

/// Snapshot of the metrics at the end of an accepted turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Year the policy was enacted for.
    pub year: u16,
    #[serde(flatten)]
    pub metrics: Metrics,
}

/// Ordered, append-only sequence of [`HistoryRecord`]s.
///
/// There is deliberately no removal or mutation API; clearing happens only by
/// replacing the whole session state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    records: Vec<HistoryRecord>,
}

impl HistoryLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn append(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&HistoryRecord> {
        self.records.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&HistoryRecord> {
        self.records.last()
    }

    /// `(year, value)` pairs for one metric, ready for a chart series.
    #[must_use]
    pub fn series(&self, key: MetricKey) -> Vec<(u16, f64)> {
        self.records
            .iter()
            .map(|record| (record.year, record.metrics.get(key)))
            .collect()
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryRecord;
    type IntoIter = std::slice::Iter<'a, HistoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
