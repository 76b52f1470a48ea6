//! The connection manager: the only writer of connection state.

use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, error, info, warn};

use super::state::{
    ConnectionState, ConnectionStatus, CLOSED_MESSAGE, ERROR_MESSAGE, FAILED_MESSAGE,
    MISSING_TARGET_MESSAGE,
};
use super::{Connector, Link, TransportEvent};
use crate::data::now_millis;
use crate::error::ConnectionError;

/// Owns one connection and drives its lifecycle.
///
/// Transitions happen in two places only: the public operations
/// (`connect`, `disconnect`) and the transport events pulled through
/// [`next_event`](Self::next_event) / [`poll_event`](Self::poll_event).
/// There is no automatic reconnection.
#[derive(Debug)]
pub struct ConnectionManager {
    connector: Box<dyn Connector>,
    default_target: Option<String>,
    state: ConnectionState,
    status: ConnectionStatus,
    link: Option<Link>,
    target: Option<String>,
}

impl ConnectionManager {
    /// Create an idle manager. `default_target` is used when `connect` is
    /// called without one.
    pub fn new(connector: Box<dyn Connector>, default_target: Option<String>) -> Self {
        Self {
            connector,
            default_target,
            state: ConnectionState::Idle,
            status: ConnectionStatus::default(),
            link: None,
            target: None,
        }
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Target of the current or most recent connection.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn connector_description(&self) -> &str {
        self.connector.description()
    }

    /// Start connecting to `target`, or the configured default.
    ///
    /// Returns once the transport has been started; the outcome arrives as
    /// a later event. Fails without opening anything when no target
    /// resolves, when the connector rejects the target, or when a
    /// connection is already opening or open (disconnect first).
    pub fn connect(&mut self, target: Option<&str>) -> Result<(), ConnectionError> {
        if self.state.is_active() {
            warn!("connect() ignored: connection is {}", self.state.label());
            return Err(ConnectionError::AlreadyActive);
        }

        let Some(target) = self.resolve_target(target) else {
            error!("No connection target given and no default configured");
            self.set_status(false, Some(MISSING_TARGET_MESSAGE));
            return Err(ConnectionError::MissingTarget);
        };

        self.target = Some(target.clone());
        match self.connector.open(&target) {
            Ok(link) => {
                info!("Connecting to {}", target);
                self.link = Some(link);
                self.state = ConnectionState::Connecting;
                Ok(())
            }
            Err(e) => {
                error!("Failed to connect to {}: {}", target, e);
                self.state = ConnectionState::Errored;
                self.set_status(false, Some(FAILED_MESSAGE));
                Err(e)
            }
        }
    }

    /// Close the connection if one is opening or open. No-op otherwise.
    pub fn disconnect(&mut self) {
        if self.link.take().is_none() {
            return;
        }
        info!("Disconnected from {}", self.target.as_deref().unwrap_or("?"));
        self.state = ConnectionState::Idle;
        self.set_status(false, None);
    }

    /// Write a text payload to the open connection.
    ///
    /// Nothing is queued: when not connected the payload is dropped and
    /// [`ConnectionError::NotConnected`] is returned.
    pub fn send_message(&self, payload: &str) -> Result<(), ConnectionError> {
        match (&self.link, self.state) {
            (Some(link), ConnectionState::Open) => {
                let sent = link.send(payload);
                if sent.is_err() {
                    error!("Transport is gone, message dropped");
                }
                sent
            }
            _ => {
                error!("Not connected, message dropped");
                Err(ConnectionError::NotConnected)
            }
        }
    }

    /// Wait for the next transport event and apply it.
    ///
    /// Returns `None` when there is no connection to wait on.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        let received = match self.link.as_mut() {
            Some(link) => link.recv().await,
            None => return None,
        };
        // A task that exits without reporting is treated as a remote close.
        let event = received.unwrap_or(TransportEvent::Closed);
        self.apply(&event);
        Some(event)
    }

    /// Apply the next transport event if one is ready, without waiting.
    pub fn poll_event(&mut self) -> Option<TransportEvent> {
        let link = self.link.as_mut()?;
        let event = match link.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => TransportEvent::Closed,
        };
        self.apply(&event);
        Some(event)
    }

    fn apply(&mut self, event: &TransportEvent) {
        match event {
            TransportEvent::Opened => {
                info!("Connection open");
                self.state = ConnectionState::Open;
                self.set_status(true, None);
            }
            TransportEvent::Frame(_) => {}
            TransportEvent::Closed => {
                info!("Connection closed by remote");
                self.link = None;
                self.state = ConnectionState::Closed;
                self.set_status(false, Some(CLOSED_MESSAGE));
            }
            TransportEvent::Error(reason) => {
                error!("Connection error: {}", reason);
                self.link = None;
                self.state = ConnectionState::Errored;
                self.set_status(false, Some(ERROR_MESSAGE));
            }
        }
    }

    fn resolve_target(&self, target: Option<&str>) -> Option<String> {
        target
            .map(str::to_string)
            .or_else(|| self.default_target.clone())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    fn set_status(&mut self, connected: bool, error: Option<&str>) {
        self.status = ConnectionStatus::new(connected, error, now_millis());
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if self.link.take().is_some() {
            debug!("Connection manager dropped, closing connection");
        }
    }
}
