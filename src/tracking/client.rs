//! Resilient order tracking subscription client
//!
//! [`OrderTracker`] owns the connection lifecycle for one tracking
//! subscription: it opens the authenticated WebSocket, subscribes to the
//! current order before surfacing the open event, classifies inbound frames,
//! and transparently reconnects after any non-clean close with bounded
//! exponential backoff. All state lives in a single actor task, so transport
//! events, commands, and the reconnect timer never race.

use super::endpoint::tracking_url;
use super::transport::{Connection, Connector, OutboundFrame, TransportEvent, WsConnector};
use super::types::{
    codes, ConnectionState, InboundMessage, LocationData, OrderUpdateData, ReconnectPolicy,
    SubscribeFrame, SubscribeOutcome, TrackerConfig, TrackerError,
};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Sleep;

/// Callbacks invoked by the tracker on lifecycle and message events
///
/// Every method has a no-op default; implementors override the ones they
/// care about. Callbacks run on the tracker's own task and should return
/// quickly.
pub trait TrackingObserver: Send {
    /// Connection is open and the subscribe frame is already on the wire
    fn on_open(&mut self) {}
    /// Connection is gone (requested or not)
    fn on_close(&mut self) {}
    /// An error code surfaced: transport failures, server `ERROR` frames,
    /// and the advisory `RECONNECTING` / terminal `RECONNECT_FAILED` notices
    fn on_error(&mut self, _code: &str, _message: &str) {}
    /// An `ORDER_UPDATE` message arrived
    fn on_order_update(&mut self, _data: &OrderUpdateData) {}
    /// A `LOCATION` message arrived
    fn on_location_update(&mut self, _data: &LocationData) {}
}

/// Point-in-time view of the tracker, mostly for status displays and tests
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerStatus {
    pub state: ConnectionState,
    pub reconnect_attempts: u32,
    pub order_id: String,
}

enum Command {
    Connect,
    Disconnect,
    Subscribe {
        order_id: String,
        reply: oneshot::Sender<SubscribeOutcome>,
    },
    Status {
        reply: oneshot::Sender<TrackerStatus>,
    },
}

/// Handle to a running tracking subscription
///
/// Cheap to use from anywhere; all methods forward to the actor task.
/// Dropping the handle shuts the tracker down after a clean close request.
pub struct OrderTracker {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl OrderTracker {
    /// Spawn a tracker over the production WebSocket transport
    ///
    /// The tracker starts disconnected; call [`connect`](Self::connect).
    pub fn new(config: TrackerConfig, observer: impl TrackingObserver + 'static) -> Self {
        Self::with_connector(config, observer, Arc::new(WsConnector))
    }

    /// Spawn a tracker over a custom transport connector
    pub fn with_connector(
        config: TrackerConfig,
        observer: impl TrackingObserver + 'static,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let worker = Worker {
            endpoint: tracking_url(&config.ws_base_url, &config.auth_token),
            policy: config.policy,
            order_id: config.order_id,
            observer: Box::new(observer),
            connector,
            cmd_rx,
            state: ConnectionState::Disconnected,
            reconnect_attempts: 0,
            conn: None,
            reconnect_timer: None,
        };

        tokio::spawn(worker.run());

        Self { cmd_tx }
    }

    /// Open (or re-open) the connection
    ///
    /// Safe to call in any state: an existing transport is torn down first,
    /// and a pending reconnect timer is cancelled.
    pub fn connect(&self) -> Result<(), TrackerError> {
        self.cmd_tx
            .send(Command::Connect)
            .map_err(|_| TrackerError::ClientClosed)
    }

    /// Request a clean close
    ///
    /// Cancels any pending reconnect timer; a clean close never triggers
    /// automatic reconnection.
    pub fn disconnect(&self) -> Result<(), TrackerError> {
        self.cmd_tx
            .send(Command::Disconnect)
            .map_err(|_| TrackerError::ClientClosed)
    }

    /// Switch the subscription to another order
    ///
    /// Sends a subscribe frame immediately when the connection is open;
    /// otherwise the new order id takes effect on the next successful open.
    /// A [`SubscribeOutcome::Deferred`] result is not a failure.
    pub async fn subscribe(
        &self,
        order_id: impl Into<String>,
    ) -> Result<SubscribeOutcome, TrackerError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Subscribe {
                order_id: order_id.into(),
                reply,
            })
            .map_err(|_| TrackerError::ClientClosed)?;
        rx.await.map_err(|_| TrackerError::ClientClosed)
    }

    /// Snapshot the current state
    pub async fn status(&self) -> Result<TrackerStatus, TrackerError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Status { reply })
            .map_err(|_| TrackerError::ClientClosed)?;
        rx.await.map_err(|_| TrackerError::ClientClosed)
    }
}

enum Tick {
    Cmd(Option<Command>),
    Transport(TransportEvent),
    ReconnectDue,
}

struct Worker {
    endpoint: String,
    policy: ReconnectPolicy,
    order_id: String,
    observer: Box<dyn TrackingObserver>,
    connector: Arc<dyn Connector>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    state: ConnectionState,
    reconnect_attempts: u32,
    conn: Option<Connection>,
    reconnect_timer: Option<Pin<Box<Sleep>>>,
}

impl Worker {
    async fn run(mut self) {
        loop {
            let tick = {
                let cmd_rx = &mut self.cmd_rx;
                let conn = &mut self.conn;
                let timer = &mut self.reconnect_timer;

                tokio::select! {
                    cmd = cmd_rx.recv() => Tick::Cmd(cmd),
                    ev = async {
                        match conn {
                            // A dropped event channel without a close event
                            // still counts as a non-clean close
                            Some(c) => c
                                .events
                                .recv()
                                .await
                                .unwrap_or(TransportEvent::Closed { clean: false }),
                            None => std::future::pending().await,
                        }
                    } => Tick::Transport(ev),
                    _ = async {
                        match timer {
                            Some(sleep) => sleep.as_mut().await,
                            None => std::future::pending().await,
                        }
                    } => Tick::ReconnectDue,
                }
            };

            match tick {
                Tick::Cmd(None) => break,
                Tick::Cmd(Some(cmd)) => self.handle_command(cmd),
                Tick::Transport(ev) => self.handle_transport_event(ev),
                Tick::ReconnectDue => {
                    self.reconnect_timer = None;
                    self.open_transport();
                }
            }
        }

        // Handle dropped: request a clean close before the task ends
        if let Some(conn) = self.conn.take() {
            let _ = conn.outbound.try_send(OutboundFrame::Close);
        }
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect => self.open_transport(),
            Command::Disconnect => self.handle_disconnect(),
            Command::Subscribe { order_id, reply } => {
                let outcome = self.handle_subscribe(order_id);
                let _ = reply.send(outcome);
            }
            Command::Status { reply } => {
                let _ = reply.send(TrackerStatus {
                    state: self.state,
                    reconnect_attempts: self.reconnect_attempts,
                    order_id: self.order_id.clone(),
                });
            }
        }
    }

    /// Open a fresh transport, superseding any existing one
    ///
    /// The previous connection's handles are dropped without surfacing a
    /// close callback, so a `connect` while already connected produces
    /// exactly one live transport and no duplicate events.
    fn open_transport(&mut self) {
        self.reconnect_timer = None;
        if let Some(prev) = self.conn.take() {
            let _ = prev.outbound.try_send(OutboundFrame::Close);
            tracing::debug!("Discarded superseded transport");
        }
        self.state = ConnectionState::Connecting;
        tracing::info!(order_id = %self.order_id, "Connecting tracking WebSocket");
        self.conn = Some(self.connector.connect(&self.endpoint));
    }

    fn handle_disconnect(&mut self) {
        self.reconnect_timer = None;
        if let Some(conn) = self.conn.take() {
            self.state = ConnectionState::Closing;
            let _ = conn.outbound.try_send(OutboundFrame::Close);
            // State flips immediately; the close ack is not awaited
            self.state = ConnectionState::Disconnected;
            tracing::info!("Tracking WebSocket disconnected by request");
            self.observer.on_close();
        } else {
            self.state = ConnectionState::Disconnected;
        }
    }

    fn handle_subscribe(&mut self, order_id: String) -> SubscribeOutcome {
        self.order_id = order_id;
        if self.state == ConnectionState::Open && self.send_subscribe() {
            SubscribeOutcome::Sent
        } else {
            SubscribeOutcome::Deferred
        }
    }

    /// Queue a subscribe frame for the current order; true if it was queued
    fn send_subscribe(&mut self) -> bool {
        let Some(conn) = &self.conn else {
            return false;
        };
        let frame = SubscribeFrame::new(self.order_id.clone());
        match serde_json::to_string(&frame) {
            Ok(json) => match conn.outbound.try_send(OutboundFrame::Text(json)) {
                Ok(()) => {
                    tracing::debug!(order_id = %self.order_id, "Sent subscribe frame");
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to queue subscribe frame");
                    false
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode subscribe frame");
                false
            }
        }
    }

    fn handle_transport_event(&mut self, ev: TransportEvent) {
        match ev {
            TransportEvent::Opened => {
                self.state = ConnectionState::Open;
                self.reconnect_attempts = 0;
                // Subscribe must be on the wire before observers hear "open"
                self.send_subscribe();
                tracing::info!(order_id = %self.order_id, "Tracking WebSocket connected");
                self.observer.on_open();
            }
            TransportEvent::Frame(text) => self.dispatch_frame(&text),
            TransportEvent::Failed(message) => {
                // The transport sends a Closed event next; that drives state
                tracing::warn!(error = %message, "Tracking WebSocket transport error");
                self.observer.on_error(codes::CONNECTION_ERROR, &message);
            }
            TransportEvent::Closed { clean } => {
                self.conn = None;
                self.state = ConnectionState::Disconnected;
                tracing::info!(clean, "Tracking WebSocket closed");
                self.observer.on_close();
                if !clean {
                    self.schedule_reconnect();
                }
            }
        }
    }

    fn dispatch_frame(&mut self, text: &str) {
        match InboundMessage::parse(text) {
            Ok(InboundMessage::OrderUpdate(data)) => {
                tracing::debug!(status = %data.status, "Order update received");
                self.observer.on_order_update(&data);
            }
            Ok(InboundMessage::Location(data)) => {
                tracing::trace!(
                    latitude = data.latitude,
                    longitude = data.longitude,
                    "Location update received"
                );
                self.observer.on_location_update(&data);
            }
            Ok(InboundMessage::Error(data)) => {
                tracing::warn!(code = %data.code, message = %data.message, "Server error message");
                self.observer.on_error(&data.code, &data.message);
            }
            Ok(InboundMessage::Unknown) => {
                tracing::debug!("Ignoring message with unknown type");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed frame");
            }
        }
    }

    fn schedule_reconnect(&mut self) {
        if self.reconnect_attempts >= self.policy.max_attempts {
            tracing::error!(
                attempts = self.reconnect_attempts,
                "Reconnect attempts exhausted"
            );
            self.observer.on_error(
                codes::RECONNECT_FAILED,
                "could not reconnect after repeated attempts",
            );
            return;
        }

        self.reconnect_attempts += 1;
        let delay = self.policy.delay_for(self.reconnect_attempts);
        tracing::warn!(
            attempt = self.reconnect_attempts,
            max_attempts = self.policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );
        self.observer.on_error(
            codes::RECONNECTING,
            &format!(
                "reconnecting (attempt {} of {})",
                self.reconnect_attempts, self.policy.max_attempts
            ),
        );
        self.reconnect_timer = Some(Box::pin(tokio::time::sleep(delay)));
    }
}
