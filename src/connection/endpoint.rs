//! Endpoint parsing and scheme-based connector selection.

use std::fmt;
use std::str::FromStr;

use super::simulated::SimulatedConnector;
use super::stream::TcpConnector;
use super::websocket::WebSocketConnector;
use super::{Connector, Link};
use crate::error::ConnectionError;

/// A parsed connection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `ws://` or `wss://` URL, kept whole.
    WebSocket { url: String, encrypted: bool },
    /// `tcp://host:port` carrying newline-delimited frames.
    Tcp { addr: String },
    /// `sim://` synthetic sensor feed.
    Simulated,
}

impl Endpoint {
    /// Whether the transport is encrypted.
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Endpoint::WebSocket { encrypted: true, .. })
    }
}

impl FromStr for Endpoint {
    type Err = ConnectionError;

    fn from_str(target: &str) -> Result<Self, Self::Err> {
        let target = target.trim();
        let (scheme, rest) = target
            .split_once("://")
            .ok_or_else(|| ConnectionError::InvalidTarget(target.to_string()))?;

        match scheme.to_ascii_lowercase().as_str() {
            "ws" | "wss" if !rest.is_empty() => Ok(Endpoint::WebSocket {
                url: target.to_string(),
                encrypted: scheme.eq_ignore_ascii_case("wss"),
            }),
            "tcp" if !rest.is_empty() => Ok(Endpoint::Tcp {
                addr: rest.trim_end_matches('/').to_string(),
            }),
            "sim" => Ok(Endpoint::Simulated),
            "ws" | "wss" | "tcp" => Err(ConnectionError::InvalidTarget(target.to_string())),
            other => Err(ConnectionError::UnsupportedScheme(other.to_string())),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::WebSocket { url, .. } => f.write_str(url),
            Endpoint::Tcp { addr } => write!(f, "tcp://{}", addr),
            Endpoint::Simulated => f.write_str("sim://"),
        }
    }
}

/// Connector that picks a transport from the target's scheme.
#[derive(Debug, Default)]
pub struct EndpointConnector {
    websocket: WebSocketConnector,
    tcp: TcpConnector,
    simulated: SimulatedConnector,
}

impl EndpointConnector {
    pub fn new(simulated: SimulatedConnector) -> Self {
        Self {
            websocket: WebSocketConnector,
            tcp: TcpConnector,
            simulated,
        }
    }
}

impl Connector for EndpointConnector {
    fn open(&self, target: &str) -> Result<Link, ConnectionError> {
        match target.parse::<Endpoint>()? {
            Endpoint::WebSocket { .. } => self.websocket.open(target),
            Endpoint::Tcp { .. } => self.tcp.open(target),
            Endpoint::Simulated => self.simulated.open(target),
        }
    }

    fn description(&self) -> &str {
        "ws, wss, tcp, sim"
    }
}
