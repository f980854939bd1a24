//! Transport seam between the tracking client and the wire
//!
//! The client consumes an opaque bidirectional message transport through the
//! [`Connector`] trait: open a connection, receive ordered events, push
//! outbound frames. [`WsConnector`] is the production implementation over
//! tokio-tungstenite; tests substitute scripted connectors.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// Low-level events surfaced by one transport connection, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Handshake completed, the connection is live
    Opened,
    /// A text frame arrived
    Frame(String),
    /// The connection is gone; `clean` is true only for a normal-closure code
    Closed { clean: bool },
    /// Transport-level error; a `Closed` event follows
    Failed(String),
}

/// Frames the client pushes onto the transport
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    Text(String),
    /// Request a clean close (normal-closure code)
    Close,
}

/// Handles for one live connection
///
/// Dropping both handles tears the underlying connection down.
pub struct Connection {
    /// Frames to send on the wire
    pub outbound: mpsc::Sender<OutboundFrame>,
    /// Events received from the wire
    pub events: mpsc::Receiver<TransportEvent>,
}

/// Opens transport connections
///
/// `connect` never blocks: handshake progress and failures are reported
/// through the returned event channel, so callers observe connection
/// failures the same way they observe later drops.
pub trait Connector: Send + Sync {
    fn connect(&self, url: &str) -> Connection;
}

/// Production connector over tokio-tungstenite
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, url: &str) -> Connection {
        let (outbound_tx, outbound_rx) = mpsc::channel(32);
        let (events_tx, events_rx) = mpsc::channel(64);
        let url = url.to_string();

        tokio::spawn(async move {
            run_connection(url, outbound_rx, events_tx).await;
        });

        Connection {
            outbound: outbound_tx,
            events: events_rx,
        }
    }
}

/// Own one WebSocket connection end to end
async fn run_connection(
    url: String,
    mut outbound: mpsc::Receiver<OutboundFrame>,
    events: mpsc::Sender<TransportEvent>,
) {
    tracing::debug!(url = %url, "Opening tracking WebSocket");

    let (ws_stream, _response) = match connect_async(&url).await {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!(error = %e, "WebSocket handshake failed");
            let _ = events.send(TransportEvent::Failed(e.to_string())).await;
            let _ = events.send(TransportEvent::Closed { clean: false }).await;
            return;
        }
    };

    if events.send(TransportEvent::Opened).await.is_err() {
        return;
    }

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if events.send(TransportEvent::Frame(text)).await.is_err() {
                            tracing::debug!("Event receiver dropped, closing connection");
                            return;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if write.send(Message::Pong(data)).await.is_err() {
                            let _ = events.send(TransportEvent::Closed { clean: false }).await;
                            return;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let clean = frame
                            .map(|f| f.code == CloseCode::Normal)
                            .unwrap_or(false);
                        tracing::debug!(clean, "Received close frame");
                        let _ = events.send(TransportEvent::Closed { clean }).await;
                        return;
                    }
                    Some(Ok(_)) => {
                        // The tracking server sends no binary frames
                    }
                    Some(Err(e)) => {
                        let _ = events.send(TransportEvent::Failed(e.to_string())).await;
                        let _ = events.send(TransportEvent::Closed { clean: false }).await;
                        return;
                    }
                    None => {
                        let _ = events.send(TransportEvent::Closed { clean: false }).await;
                        return;
                    }
                }
            }

            frame = outbound.recv() => {
                match frame {
                    Some(OutboundFrame::Text(text)) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            let _ = events.send(TransportEvent::Failed(e.to_string())).await;
                            let _ = events.send(TransportEvent::Closed { clean: false }).await;
                            return;
                        }
                    }
                    Some(OutboundFrame::Close) => {
                        let _ = write
                            .send(Message::Close(Some(CloseFrame {
                                code: CloseCode::Normal,
                                reason: "client disconnect".into(),
                            })))
                            .await;
                        let _ = events.send(TransportEvent::Closed { clean: true }).await;
                        return;
                    }
                    None => {
                        // Handle dropped (superseding connect or client shutdown)
                        let _ = write
                            .send(Message::Close(Some(CloseFrame {
                                code: CloseCode::Normal,
                                reason: "superseded".into(),
                            })))
                            .await;
                        return;
                    }
                }
            }
        }
    }
}
