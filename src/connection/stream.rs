//! Newline-delimited stream transport.
//!
//! Each line read from the stream is one text frame; each outbound payload
//! is written as one line. This is useful for plain TCP relays or any other
//! async byte stream.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use super::{runtime, Connector, Endpoint, Link, LinkEnd, TransportEvent};
use crate::error::ConnectionError;

/// Opens `tcp://host:port` connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn open(&self, target: &str) -> Result<Link, ConnectionError> {
        let addr = match target.parse::<Endpoint>()? {
            Endpoint::Tcp { addr } => addr,
            other => return Err(ConnectionError::InvalidTarget(other.to_string())),
        };

        let runtime = runtime()?;

        let (link, end) = Link::pair(target);
        runtime.spawn(async move {
            let connected = tokio::select! {
                result = TcpStream::connect(addr.as_str()) => result,
                _ = end.detached() => return,
            };
            match connected {
                Ok(stream) => {
                    info!("Connected to {}", addr);
                    run_stream(stream, end).await;
                }
                Err(e) => {
                    warn!("Failed to connect to {}: {}", addr, e);
                    end.emit(TransportEvent::Error(e.to_string())).await;
                }
            }
        });
        Ok(link)
    }

    fn description(&self) -> &str {
        "tcp"
    }
}

/// Spawn a link over an already-open async stream.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
///
/// # Example
///
/// ```
/// use syncpulse::connection::{spawn_stream, TransportEvent};
///
/// # tokio_test::block_on(async {
/// let (client, _server) = tokio::io::duplex(1024);
/// let mut link = spawn_stream(client, "example");
/// assert_eq!(link.recv().await, Some(TransportEvent::Opened));
/// # });
/// ```
pub fn spawn_stream<S>(stream: S, description: &str) -> Link
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (link, end) = Link::pair(description);
    tokio::spawn(run_stream(stream, end));
    link
}

/// Pump lines in both directions until EOF, an I/O error, or the link drops.
async fn run_stream<S>(stream: S, mut end: LinkEnd)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    if !end.emit(TransportEvent::Opened).await {
        return;
    }

    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();

    loop {
        tokio::select! {
            read = lines.next_line() => match read {
                Ok(None) => {
                    // EOF
                    end.emit(TransportEvent::Closed).await;
                    break;
                }
                Ok(Some(line)) => {
                    let frame = line.trim();
                    if frame.is_empty() {
                        continue;
                    }
                    if !end.emit(TransportEvent::Frame(frame.to_string())).await {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Read error: {}", e);
                    end.emit(TransportEvent::Error(format!("Read error: {}", e))).await;
                    break;
                }
            },
            outbound = end.next_outbound() => match outbound {
                Some(payload) => {
                    let written = async {
                        writer.write_all(payload.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await
                    };
                    if let Err(e) = written.await {
                        warn!("Write error: {}", e);
                        end.emit(TransportEvent::Error(format!("Write error: {}", e))).await;
                        break;
                    }
                }
                None => {
                    let _ = writer.shutdown().await;
                    debug!("Stream closed locally");
                    break;
                }
            },
        }
    }
}
