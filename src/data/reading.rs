//! Canonical reading types shared by the normalizer, history and status code.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Current wall-clock time as epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// One of the three sensor channels carried by every reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Ambient temperature from the BMP sensor.
    BmpTemp,
    /// Probe temperature.
    ProbeTemp,
    /// Barometric pressure.
    Pressure,
}

impl Metric {
    /// All metrics in display and export column order.
    pub const ALL: [Metric; 3] = [Metric::BmpTemp, Metric::ProbeTemp, Metric::Pressure];

    /// Field name in the snake_case wire spelling.
    pub fn snake_name(&self) -> &'static str {
        match self {
            Metric::BmpTemp => "bmp_temp",
            Metric::ProbeTemp => "probe_temp",
            Metric::Pressure => "pressure",
        }
    }

    /// Field name in the camelCase wire spelling.
    pub fn camel_name(&self) -> &'static str {
        match self {
            Metric::BmpTemp => "bmpTemp",
            Metric::ProbeTemp => "probeTemp",
            Metric::Pressure => "pressure",
        }
    }

    /// Human-readable label, also used as the export column header.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::BmpTemp => "BMP Temperature",
            Metric::ProbeTemp => "Probe Temperature",
            Metric::Pressure => "Pressure",
        }
    }

    /// Display unit.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::BmpTemp | Metric::ProbeTemp => "°C",
            Metric::Pressure => "hPa",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fully decoded reading: all three values plus the time it was processed.
///
/// Only the normalizer builds these, and only when every metric decoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReading {
    pub bmp_temp: f64,
    pub probe_temp: f64,
    pub pressure: f64,
    /// Epoch milliseconds at which the frame was processed.
    pub timestamp: i64,
}

impl CanonicalReading {
    /// Value of a single metric.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::BmpTemp => self.bmp_temp,
            Metric::ProbeTemp => self.probe_temp,
            Metric::Pressure => self.pressure,
        }
    }
}

/// A single point in a metric's history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub value: f64,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_value_by_metric() {
        let reading = CanonicalReading {
            bmp_temp: 28.6,
            probe_temp: 30.1,
            pressure: 946.23,
            timestamp: 0,
        };
        assert_eq!(reading.value(Metric::BmpTemp), 28.6);
        assert_eq!(reading.value(Metric::ProbeTemp), 30.1);
        assert_eq!(reading.value(Metric::Pressure), 946.23);
    }

    #[test]
    fn test_metric_wire_names() {
        assert_eq!(Metric::BmpTemp.snake_name(), "bmp_temp");
        assert_eq!(Metric::ProbeTemp.camel_name(), "probeTemp");
        assert_eq!(Metric::Pressure.snake_name(), Metric::Pressure.camel_name());
    }

    #[test]
    fn test_reading_serializes_camel_case() {
        let reading = CanonicalReading {
            bmp_temp: 1.0,
            probe_temp: 2.0,
            pressure: 3.0,
            timestamp: 4,
        };
        let json = serde_json::to_value(reading).unwrap();
        assert_eq!(json["bmpTemp"], 1.0);
        assert_eq!(json["probeTemp"], 2.0);
    }
}
