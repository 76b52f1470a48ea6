//! WebSocket transport (`ws://` and `wss://`).

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::{runtime, Connector, Endpoint, Link, LinkEnd, TransportEvent};
use crate::error::ConnectionError;

/// Opens WebSocket connections, plain or TLS depending on the URL scheme.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    fn open(&self, target: &str) -> Result<Link, ConnectionError> {
        let endpoint = target.parse::<Endpoint>()?;
        let Endpoint::WebSocket { ref url, .. } = endpoint else {
            return Err(ConnectionError::InvalidTarget(endpoint.to_string()));
        };
        let runtime = runtime()?;

        debug!(
            "Opening {} WebSocket to {}",
            if endpoint.is_encrypted() { "TLS" } else { "plain" },
            url
        );
        let (link, end) = Link::pair(target);
        runtime.spawn(run(url.clone(), end));
        Ok(link)
    }

    fn description(&self) -> &str {
        "websocket"
    }
}

/// Connect, then pump frames both ways until either side goes away.
async fn run(url: String, mut end: LinkEnd) {
    let connected = tokio::select! {
        result = tokio_tungstenite::connect_async(url.as_str()) => result,
        _ = end.detached() => {
            debug!("Connect to {} cancelled", url);
            return;
        }
    };

    let stream = match connected {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!("WebSocket connect to {} failed: {}", url, e);
            end.emit(TransportEvent::Error(e.to_string())).await;
            return;
        }
    };

    info!("WebSocket connected to {}", url);
    if !end.emit(TransportEvent::Opened).await {
        return;
    }

    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            incoming = source.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if !end.emit(TransportEvent::Frame(text)).await {
                        break;
                    }
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => {
                        if !end.emit(TransportEvent::Frame(text)).await {
                            break;
                        }
                    }
                    Err(_) => debug!("Skipping non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    debug!("Server closed connection: {:?}", frame);
                    end.emit(TransportEvent::Closed).await;
                    break;
                }
                // Ping/pong are answered by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket read error: {}", e);
                    end.emit(TransportEvent::Error(e.to_string())).await;
                    break;
                }
                None => {
                    end.emit(TransportEvent::Closed).await;
                    break;
                }
            },
            outbound = end.next_outbound() => match outbound {
                Some(payload) => {
                    if let Err(e) = sink.send(Message::Text(payload)).await {
                        warn!("WebSocket write error: {}", e);
                        end.emit(TransportEvent::Error(e.to_string())).await;
                        break;
                    }
                }
                None => {
                    // Link dropped: close our side.
                    let _ = sink.close().await;
                    debug!("WebSocket to {} closed locally", url);
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn serve_once(frames: Vec<&'static str>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            for frame in frames {
                ws.send(Message::Text(frame.to_string())).await.unwrap();
            }

            // Collect what the client sends until it closes.
            let mut received = Vec::new();
            while let Some(Ok(message)) = ws.next().await {
                match message {
                    Message::Text(text) => received.push(text),
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            received
        });

        (format!("ws://{}", addr), handle)
    }

    #[tokio::test]
    async fn test_websocket_round_trip() {
        let (url, server) = serve_once(vec![r#"{"bmpTemp":28.6,"probeTemp":30.1,"pressure":946.23}"#]).await;

        let mut link = WebSocketConnector.open(&url).unwrap();
        assert_eq!(link.recv().await, Some(TransportEvent::Opened));
        match link.recv().await {
            Some(TransportEvent::Frame(text)) => assert!(text.contains("bmpTemp")),
            other => panic!("expected frame, got {:?}", other),
        }

        link.send("hello").unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        drop(link);

        let received = server.await.unwrap();
        assert_eq!(received, vec!["hello".to_string()]);
    }

    #[test]
    fn test_open_checks_target_and_runtime() {
        assert!(matches!(
            WebSocketConnector.open("tcp://localhost:1"),
            Err(ConnectionError::InvalidTarget(_))
        ));
        // No runtime in a plain test.
        assert!(matches!(
            WebSocketConnector.open("ws://localhost:1"),
            Err(ConnectionError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_websocket_refused_reports_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut link = WebSocketConnector.open(&format!("ws://{}", addr)).unwrap();
        assert!(matches!(link.recv().await, Some(TransportEvent::Error(_))));
    }
}
