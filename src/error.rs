//! Error types for the connection, ingestion, export and config layers.

use thiserror::Error;

use crate::data::Metric;

/// Errors raised by the connection manager and its transports.
///
/// None of these are fatal. The manager mirrors the relevant ones into
/// [`ConnectionStatus`](crate::connection::ConnectionStatus) so callers that
/// ignore the return value still observe them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Neither an explicit target nor a configured default was available.
    #[error("Missing target")]
    MissingTarget,

    /// The target could not be parsed as an endpoint.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// The target uses a scheme no connector handles.
    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// An operation required an open connection.
    #[error("Not connected")]
    NotConnected,

    /// `connect` was called while a connection was opening or open.
    #[error("Connection already active")]
    AlreadyActive,

    /// The transport failed underneath an open or opening connection.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Why an inbound frame was dropped instead of producing a reading.
#[derive(Debug, Error)]
pub enum Rejection {
    /// The frame was not valid JSON.
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The frame decoded, but not to an object carrying sensor fields.
    #[error("Frame is not an object")]
    NotAnObject,

    /// One or more metrics were absent or not numeric.
    #[error("Incomplete data, missing: {}", format_metrics(.missing))]
    Incomplete { missing: Vec<Metric> },
}

fn format_metrics(metrics: &[Metric]) -> String {
    metrics.iter().map(|m| m.snake_name()).collect::<Vec<_>>().join(", ")
}

/// Errors from exporting history.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There is nothing recorded yet.
    #[error("No data to export")]
    NoData,

    /// The CSV writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the export file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not deserialize.
    #[error("Invalid configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The settings loaded but describe an unusable setup.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
