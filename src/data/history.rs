//! Bounded per-metric history of accepted readings.

use std::collections::VecDeque;

use super::reading::{CanonicalReading, DataPoint, Metric};

/// Default number of points kept per metric.
pub const DEFAULT_CAPACITY: usize = 20;

/// Fixed-capacity, time-ordered series for one metric.
///
/// Appending at capacity evicts the oldest point first.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricHistory {
    points: VecDeque<DataPoint>,
    capacity: usize,
}

impl MetricHistory {
    /// Create an empty series. A capacity of zero is raised to one.
    ///
    /// Storage grows with the points pushed, not with `capacity`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Append a point, returning the evicted oldest point if the series was full.
    pub fn push(&mut self, point: DataPoint) -> Option<DataPoint> {
        self.points.push_back(point);
        if self.points.len() > self.capacity {
            self.points.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Point at `index`, oldest first.
    pub fn get(&self, index: usize) -> Option<&DataPoint> {
        self.points.get(index)
    }

    /// Most recent point.
    pub fn latest(&self) -> Option<&DataPoint> {
        self.points.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &DataPoint> {
        self.points.iter()
    }

    /// Values oldest to newest.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    fn clear(&mut self) {
        self.points.clear();
    }
}

/// Three parallel bounded series, one per metric.
///
/// [`HistoricalData::append`] pushes all three together, so the same index
/// refers to the same reading as long as nothing pushes a metric alone.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalData {
    pub bmp_temp: MetricHistory,
    pub probe_temp: MetricHistory,
    pub pressure: MetricHistory,
}

impl Default for HistoricalData {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoricalData {
    pub fn new(capacity: usize) -> Self {
        Self {
            bmp_temp: MetricHistory::new(capacity),
            probe_temp: MetricHistory::new(capacity),
            pressure: MetricHistory::new(capacity),
        }
    }

    /// The series for one metric.
    pub fn series(&self, metric: Metric) -> &MetricHistory {
        match metric {
            Metric::BmpTemp => &self.bmp_temp,
            Metric::ProbeTemp => &self.probe_temp,
            Metric::Pressure => &self.pressure,
        }
    }

    fn series_mut(&mut self, metric: Metric) -> &mut MetricHistory {
        match metric {
            Metric::BmpTemp => &mut self.bmp_temp,
            Metric::ProbeTemp => &mut self.probe_temp,
            Metric::Pressure => &mut self.pressure,
        }
    }

    /// Append every metric of a reading under the reading's timestamp.
    pub fn append(&mut self, reading: &CanonicalReading) {
        for metric in Metric::ALL {
            self.series_mut(metric).push(DataPoint {
                value: reading.value(metric),
                timestamp: reading.timestamp,
            });
        }
    }

    /// Append a point to a single metric.
    ///
    /// Used for sources that report metrics individually. Series may then
    /// differ in length and index pairing becomes best effort.
    pub fn push(&mut self, metric: Metric, point: DataPoint) -> Option<DataPoint> {
        self.series_mut(metric).push(point)
    }

    /// Length of the longest series.
    pub fn max_len(&self) -> usize {
        Metric::ALL.iter().map(|m| self.series(*m).len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.max_len() == 0
    }

    pub fn clear(&mut self) {
        for metric in Metric::ALL {
            self.series_mut(metric).clear();
        }
    }
}

/// Latest reading plus the bounded history behind it.
///
/// Both are updated in the same call, so a reader never observes a current
/// reading that is not also the newest history entry.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    current: Option<CanonicalReading>,
    history: HistoricalData,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            current: None,
            history: HistoricalData::new(capacity),
        }
    }

    /// Record an accepted reading.
    pub fn append(&mut self, reading: CanonicalReading) {
        self.history.append(&reading);
        self.current = Some(reading);
    }

    /// Drop all history and the current reading.
    pub fn clear(&mut self) {
        self.history.clear();
        self.current = None;
    }

    /// The most recent accepted reading, if any.
    pub fn current(&self) -> Option<&CanonicalReading> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &HistoricalData {
        &self.history
    }

    pub fn capacity(&self) -> usize {
        self.history.bmp_temp.capacity()
    }
}
