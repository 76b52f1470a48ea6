//! Connection management and transports.
//!
//! The [`ConnectionManager`] owns the single connection and its lifecycle.
//! Transports sit behind the [`Connector`] trait: opening one spawns a
//! background task and returns a [`Link`] right away, and the task reports
//! what happens as [`TransportEvent`]s.
//!
//! ```text
//!  ConnectionManager ── connect(target) ──▶ Connector::open ──▶ spawned task
//!        ▲                                                        │
//!        └──────────── Link (events in, payloads out) ◀───────────┘
//! ```
//!
//! Available connectors: [`WebSocketConnector`] (`ws://`, `wss://`),
//! [`TcpConnector`] (`tcp://`, newline-delimited), [`SimulatedConnector`]
//! (`sim://`), [`ChannelConnector`] (in-process), and [`EndpointConnector`],
//! which picks one of the first three from the target's scheme.

mod channel;
mod endpoint;
mod link;
mod manager;
mod simulated;
mod state;
mod stream;
mod websocket;

pub use channel::{ChannelConnector, RemotePeer};
pub use endpoint::{Endpoint, EndpointConnector};
pub use link::{Link, LinkEnd};
pub use manager::ConnectionManager;
pub use simulated::{SensorWalk, SimulatedConnector, DEFAULT_INTERVAL as DEFAULT_SIMULATION_INTERVAL};
pub use state::{ConnectionState, ConnectionStatus};
pub use stream::{spawn_stream, TcpConnector};
pub use websocket::WebSocketConnector;

use std::fmt::Debug;

use crate::error::ConnectionError;

/// What a transport task reports about its connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is established.
    Opened,
    /// One inbound text frame.
    Frame(String),
    /// The remote end closed the connection.
    Closed,
    /// The transport failed; the connection is unusable.
    Error(String),
}

/// Runtime that transport tasks are spawned on.
///
/// Opening a connection outside a tokio runtime fails instead of panicking.
fn runtime() -> Result<tokio::runtime::Handle, ConnectionError> {
    tokio::runtime::Handle::try_current()
        .map_err(|_| ConnectionError::Transport("no tokio runtime running".to_string()))
}

/// Trait for opening connections to a target.
///
/// Implementations must not block: `open` spawns whatever work the
/// connection needs and reports progress through the returned [`Link`].
/// Connectors that spawn tasks fail with [`ConnectionError::Transport`]
/// when called outside a tokio runtime.
pub trait Connector: Send + Debug {
    /// Start connecting to `target`.
    fn open(&self, target: &str) -> Result<Link, ConnectionError>;

    /// Returns a human-readable description of the connector.
    fn description(&self) -> &str;
}
