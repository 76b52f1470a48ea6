//! Status classification and trend derivation.
//!
//! Classification is a pure function of a value and its metric's configured
//! range. A value inside `[min, max]` is normal; outside it but within the
//! band widened to `[0.9 * min, 1.1 * max]` is a warning; beyond that band
//! is critical.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::reading::{CanonicalReading, Metric};

/// How long a trend arrow stays visible after an update.
pub const TREND_DISPLAY_WINDOW: Duration = Duration::from_secs(2);

/// Lower edge of the warning band as a fraction of `min`.
const WARNING_LOW_FACTOR: f64 = 0.9;
/// Upper edge of the warning band as a fraction of `max`.
const WARNING_HIGH_FACTOR: f64 = 1.1;

/// Inclusive normal range for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Classify a value against this range.
    pub fn classify(&self, value: f64) -> Classification {
        if value < self.min * WARNING_LOW_FACTOR || value > self.max * WARNING_HIGH_FACTOR {
            Classification::Critical
        } else if !self.contains(value) {
            Classification::Warning
        } else {
            Classification::Normal
        }
    }
}

/// Configured normal ranges for all metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ranges {
    pub bmp_temp: MetricRange,
    pub probe_temp: MetricRange,
    pub pressure: MetricRange,
}

impl Default for Ranges {
    fn default() -> Self {
        Self {
            bmp_temp: MetricRange::new(25.0, 32.0),
            probe_temp: MetricRange::new(27.0, 34.0),
            pressure: MetricRange::new(900.0, 1000.0),
        }
    }
}

impl Ranges {
    pub fn get(&self, metric: Metric) -> &MetricRange {
        match metric {
            Metric::BmpTemp => &self.bmp_temp,
            Metric::ProbeTemp => &self.probe_temp,
            Metric::Pressure => &self.pressure,
        }
    }
}

/// Status classification for a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Normal,
    Warning,
    Critical,
}

impl Classification {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Classification::Normal => "OK",
            Classification::Warning => "WARN",
            Classification::Critical => "CRIT",
        }
    }
}

/// Direction of change relative to the previous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Unchanged,
}

impl Trend {
    /// Compare a new value against the previous one, if there was one.
    pub fn between(previous: Option<f64>, value: f64) -> Self {
        match previous {
            Some(prev) if value > prev => Trend::Up,
            Some(prev) if value < prev => Trend::Down,
            _ => Trend::Unchanged,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Unchanged => " ",
        }
    }
}

/// Derived view of one metric after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricStatus {
    pub classification: Classification,
    pub trend: Trend,
}

impl Default for MetricStatus {
    fn default() -> Self {
        Self {
            classification: Classification::Normal,
            trend: Trend::Unchanged,
        }
    }
}

impl MetricStatus {
    /// Derive status from a new value, its range and the previous value.
    pub fn derive(value: f64, range: &MetricRange, previous: Option<f64>) -> Self {
        Self {
            classification: range.classify(value),
            trend: Trend::between(previous, value),
        }
    }

    /// Like [`derive`](Self::derive), but `None` stands for the "no data"
    /// placeholder, which is always normal with no trend.
    pub fn for_display(value: Option<f64>, range: &MetricRange, previous: Option<f64>) -> Self {
        match value {
            Some(value) => Self::derive(value, range, previous),
            None => Self::default(),
        }
    }
}

/// Status of all three metrics for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadingStatus {
    pub bmp_temp: MetricStatus,
    pub probe_temp: MetricStatus,
    pub pressure: MetricStatus,
}

impl ReadingStatus {
    /// Derive every metric's status from a reading and the one before it.
    pub fn derive(
        reading: &CanonicalReading,
        previous: Option<&CanonicalReading>,
        ranges: &Ranges,
    ) -> Self {
        let status = |metric: Metric| {
            MetricStatus::derive(
                reading.value(metric),
                ranges.get(metric),
                previous.map(|p| p.value(metric)),
            )
        };
        Self {
            bmp_temp: status(Metric::BmpTemp),
            probe_temp: status(Metric::ProbeTemp),
            pressure: status(Metric::Pressure),
        }
    }

    pub fn get(&self, metric: Metric) -> &MetricStatus {
        match metric {
            Metric::BmpTemp => &self.bmp_temp,
            Metric::ProbeTemp => &self.probe_temp,
            Metric::Pressure => &self.pressure,
        }
    }

    /// The worst classification across all metrics.
    pub fn worst(&self) -> Classification {
        Metric::ALL
            .iter()
            .map(|m| self.get(*m).classification)
            .max()
            .unwrap_or(Classification::Normal)
    }
}

/// Presentation timer for a trend arrow.
///
/// Holds the last non-flat trend and decays it back to
/// [`Trend::Unchanged`] once [`TREND_DISPLAY_WINDOW`] has elapsed.
#[derive(Debug, Clone, Default)]
pub struct TrendIndicator {
    shown: Option<(Trend, Instant)>,
}

impl TrendIndicator {
    /// Show a trend starting at `now`. A flat trend clears the indicator.
    pub fn set(&mut self, trend: Trend, now: Instant) {
        self.shown = match trend {
            Trend::Unchanged => None,
            trend => Some((trend, now)),
        };
    }

    /// The trend to display at `now`.
    pub fn current(&self, now: Instant) -> Trend {
        match self.shown {
            Some((trend, since)) if now.saturating_duration_since(since) < TREND_DISPLAY_WINDOW => {
                trend
            }
            _ => Trend::Unchanged,
        }
    }

    pub fn clear(&mut self) {
        self.shown = None;
    }
}
