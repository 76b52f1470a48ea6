//! The handle pair joining the connection manager to a transport task.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use super::TransportEvent;
use crate::error::ConnectionError;

/// Buffered transport events per link.
const EVENT_BUFFER: usize = 64;

/// Manager-side handle to one connection.
///
/// Dropping the link is how a connection is torn down: the transport task
/// sees its outbound channel close, sends a close frame where the transport
/// has one, and exits. Events still in flight are discarded with it.
#[derive(Debug)]
pub struct Link {
    events: mpsc::Receiver<TransportEvent>,
    outbound: mpsc::UnboundedSender<String>,
    description: String,
}

/// Transport-side end of a [`Link`].
#[derive(Debug)]
pub struct LinkEnd {
    events: mpsc::Sender<TransportEvent>,
    outbound: mpsc::UnboundedReceiver<String>,
}

impl Link {
    /// Create a connected link/end pair.
    pub fn pair(description: &str) -> (Link, LinkEnd) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let link = Link {
            events: event_rx,
            outbound: outbound_tx,
            description: description.to_string(),
        };
        let end = LinkEnd {
            events: event_tx,
            outbound: outbound_rx,
        };
        (link, end)
    }

    /// Queue a text payload for the transport to write.
    ///
    /// Fails with [`ConnectionError::NotConnected`] once the transport task
    /// has exited.
    pub fn send(&self, payload: &str) -> Result<(), ConnectionError> {
        self.outbound
            .send(payload.to_string())
            .map_err(|_| ConnectionError::NotConnected)
    }

    /// Wait for the next transport event.
    ///
    /// Returns `None` once the transport task has exited and every event
    /// has been received.
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    /// Take the next transport event without waiting.
    pub fn try_recv(&mut self) -> Result<TransportEvent, TryRecvError> {
        self.events.try_recv()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl LinkEnd {
    /// Deliver an event to the manager. Returns `false` if the link is gone.
    pub async fn emit(&self, event: TransportEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// Deliver an event without waiting. Returns `false` if the link is
    /// gone or its event buffer is full.
    pub fn try_emit(&self, event: TransportEvent) -> bool {
        self.events.try_send(event).is_ok()
    }

    /// Next outbound payload, or `None` once the link has been dropped.
    pub async fn next_outbound(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    /// Take a queued outbound payload without waiting.
    pub fn try_next_outbound(&mut self) -> Option<String> {
        self.outbound.try_recv().ok()
    }

    /// Completes when the manager has dropped the link.
    pub async fn detached(&self) {
        self.events.closed().await
    }

    pub fn is_detached(&self) -> bool {
        self.events.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_reach_link() {
        let (mut link, end) = Link::pair("test");
        assert!(end.emit(TransportEvent::Opened).await);
        assert!(end.try_emit(TransportEvent::Frame("{}".to_string())));

        assert_eq!(link.recv().await, Some(TransportEvent::Opened));
        assert_eq!(link.try_recv().ok(), Some(TransportEvent::Frame("{}".to_string())));
    }

    #[tokio::test]
    async fn test_outbound_reaches_end() {
        let (link, mut end) = Link::pair("test");
        link.send("ping").unwrap();
        assert_eq!(end.next_outbound().await.as_deref(), Some("ping"));
    }

    #[tokio::test]
    async fn test_dropping_link_detaches_end() {
        let (link, mut end) = Link::pair("test");
        assert!(!end.is_detached());
        drop(link);

        end.detached().await;
        assert!(end.is_detached());
        assert!(end.next_outbound().await.is_none());
        assert!(!end.emit(TransportEvent::Opened).await);
    }

    #[test]
    fn test_send_after_end_dropped() {
        let (link, end) = Link::pair("test");
        drop(end);
        assert_eq!(link.send("hello"), Err(ConnectionError::NotConnected));
    }

    #[test]
    fn test_description() {
        let (link, _end) = Link::pair("ws://localhost:5000");
        assert_eq!(link.description(), "ws://localhost:5000");
    }
}
