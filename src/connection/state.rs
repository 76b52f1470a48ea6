//! Connection lifecycle state and the status record exposed to consumers.

use serde::{Deserialize, Serialize};

/// Status message after the transport reported a remote close.
pub const CLOSED_MESSAGE: &str = "Connection closed";
/// Status message after the transport reported an error.
pub const ERROR_MESSAGE: &str = "Connection error";
/// Status message when `connect` had no target to use.
pub const MISSING_TARGET_MESSAGE: &str = "Missing target";
/// Status message when the connector refused to open the target.
pub const FAILED_MESSAGE: &str = "Failed to connect";

/// Lifecycle of the managed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Never connected, or disconnected on request.
    #[default]
    Idle,
    /// Transport opening; no events beyond `Opened` expected yet.
    Connecting,
    /// Transport open and delivering frames.
    Open,
    /// Remote end closed the connection.
    Closed,
    /// Transport failed.
    Errored,
}

impl ConnectionState {
    /// Whether a connection is opening or open.
    pub fn is_active(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Open)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
            ConnectionState::Errored => "errored",
        }
    }
}

/// Observable connection status. Only the connection manager writes it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    pub error: Option<String>,
    /// Epoch milliseconds of the last transition.
    pub last_updated: Option<i64>,
}

impl ConnectionStatus {
    pub(crate) fn new(connected: bool, error: Option<&str>, now: i64) -> Self {
        Self {
            connected,
            error: error.map(str::to_string),
            last_updated: Some(now),
        }
    }
}
