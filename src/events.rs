//! Events surfaced by the dashboard after each transport event is applied.

use std::fmt;

use crate::connection::ConnectionStatus;
use crate::data::{CanonicalReading, Metric, ReadingStatus};
use crate::error::Rejection;

/// Outcome of one processed transport event.
#[derive(Debug)]
pub enum DashboardEvent {
    /// The connection status changed.
    Status(ConnectionStatus),
    /// A frame was accepted and recorded.
    Reading {
        reading: CanonicalReading,
        status: ReadingStatus,
    },
    /// A frame was dropped.
    Rejected(Rejection),
}

impl DashboardEvent {
    pub fn is_reading(&self) -> bool {
        matches!(self, DashboardEvent::Reading { .. })
    }
}

/// One-line summary, e.g.
/// `BMP Temperature 28.6 °C OK ↑ | Probe Temperature 30.1 °C OK   | Pressure 946.23 hPa OK  `.
impl fmt::Display for DashboardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardEvent::Status(status) => match (&status.error, status.connected) {
                (_, true) => write!(f, "Connected"),
                (Some(error), false) => write!(f, "Disconnected: {}", error),
                (None, false) => write!(f, "Disconnected"),
            },
            DashboardEvent::Reading { reading, status } => {
                for (i, metric) in Metric::ALL.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    let metric_status = status.get(*metric);
                    write!(
                        f,
                        "{} {} {} {} {}",
                        metric.label(),
                        reading.value(*metric),
                        metric.unit(),
                        metric_status.classification.symbol(),
                        metric_status.trend.arrow()
                    )?;
                }
                Ok(())
            }
            DashboardEvent::Rejected(rejection) => write!(f, "Dropped frame: {}", rejection),
        }
    }
}
