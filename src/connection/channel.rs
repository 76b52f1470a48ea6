//! In-process connector.
//!
//! Each `open` hands the far end of the new link to the caller as a
//! [`RemotePeer`]. This is useful for bridging frames from another source
//! (a message bus subscription, a file replay) and for driving the
//! connection manager in tests.

use tokio::sync::mpsc;

use super::{Connector, Link, LinkEnd, TransportEvent};
use crate::error::ConnectionError;

/// A connector whose remote ends are delivered over a channel.
///
/// # Example
///
/// ```
/// use syncpulse::connection::{ChannelConnector, ConnectionManager};
///
/// let (connector, mut peers) = ChannelConnector::create();
/// let mut manager = ConnectionManager::new(Box::new(connector), None);
/// manager.connect(Some("bridge://sensors")).unwrap();
///
/// let peer = peers.try_recv().unwrap();
/// assert_eq!(peer.target(), "bridge://sensors");
/// peer.open();
/// ```
#[derive(Debug, Clone)]
pub struct ChannelConnector {
    peers: mpsc::UnboundedSender<RemotePeer>,
}

impl ChannelConnector {
    /// Create a connector and the receiver its remote ends arrive on.
    pub fn create() -> (Self, mpsc::UnboundedReceiver<RemotePeer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { peers: tx }, rx)
    }
}

impl Connector for ChannelConnector {
    fn open(&self, target: &str) -> Result<Link, ConnectionError> {
        let (link, end) = Link::pair(target);
        self.peers
            .send(RemotePeer {
                target: target.to_string(),
                end,
            })
            .map_err(|_| ConnectionError::Transport("peer receiver dropped".to_string()))?;
        Ok(link)
    }

    fn description(&self) -> &str {
        "channel"
    }
}

/// The remote side of a link opened by [`ChannelConnector`].
///
/// Event methods return `false` once the manager has dropped the link.
#[derive(Debug)]
pub struct RemotePeer {
    target: String,
    end: LinkEnd,
}

impl RemotePeer {
    /// The target the manager asked to connect to.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Report the connection as open.
    pub fn open(&self) -> bool {
        self.end.try_emit(TransportEvent::Opened)
    }

    /// Deliver one inbound text frame.
    pub fn frame(&self, text: impl Into<String>) -> bool {
        self.end.try_emit(TransportEvent::Frame(text.into()))
    }

    /// Report a remote close.
    pub fn close(self) -> bool {
        self.end.try_emit(TransportEvent::Closed)
    }

    /// Report a transport error.
    pub fn fail(self, reason: &str) -> bool {
        self.end.try_emit(TransportEvent::Error(reason.to_string()))
    }

    /// Take the next message the manager sent, if any.
    pub fn try_recv_outbound(&mut self) -> Option<String> {
        self.end.try_next_outbound()
    }

    /// Wait for the next message the manager sent.
    pub async fn recv_outbound(&mut self) -> Option<String> {
        self.end.next_outbound().await
    }

    /// Whether the manager has dropped this link.
    pub fn is_detached(&self) -> bool {
        self.end.is_detached()
    }
}
