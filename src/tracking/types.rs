//! Tracking client types and configuration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Observer-visible error codes
///
/// String codes passed to `on_error`; server-provided codes from `ERROR`
/// frames are forwarded verbatim alongside these client-generated ones.
pub mod codes {
    /// Transport-level failure (refused connection, abrupt drop)
    pub const CONNECTION_ERROR: &str = "CONNECTION_ERROR";
    /// Advisory: a reconnect attempt has been scheduled
    pub const RECONNECTING: &str = "RECONNECTING";
    /// Terminal: reconnect attempts exhausted, client stays disconnected
    pub const RECONNECT_FAILED: &str = "RECONNECT_FAILED";
}

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No live transport; initial state and where `disconnect()` lands
    Disconnected,
    /// Transport opening in progress
    Connecting,
    /// Transport open, subscription active
    Open,
    /// Clean close requested, waiting for the transport to go away
    Closing,
}

/// Reconnect backoff configuration
///
/// Stateless; the client consults it to compute the delay before each
/// automatic reconnect attempt.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Maximum automatic reconnect attempts before giving up
    pub max_attempts: u32,
    /// Base delay, doubled per attempt
    pub base_delay: Duration,
    /// Cap on the computed delay
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30000),
        }
    }
}

impl ReconnectPolicy {
    /// Set maximum reconnect attempts
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay
    pub fn base_delay(mut self, d: Duration) -> Self {
        self.base_delay = d;
        self
    }

    /// Set the delay cap
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    /// Backoff delay for the given attempt number (1-based):
    /// `min(max_delay, base_delay * 2^attempt)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(31));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Configuration for a tracking subscription
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// WebSocket base address, e.g. `ws://localhost:7319/api/v1`
    pub ws_base_url: String,
    /// Opaque bearer token carried in the connection URL
    pub auth_token: String,
    /// Order id the subscription is scoped to
    pub order_id: String,
    /// Reconnect backoff policy
    pub policy: ReconnectPolicy,
}

impl TrackerConfig {
    /// Create a config with the default reconnect policy
    pub fn new(
        ws_base_url: impl Into<String>,
        auth_token: impl Into<String>,
        order_id: impl Into<String>,
    ) -> Self {
        Self {
            ws_base_url: ws_base_url.into(),
            auth_token: auth_token.into(),
            order_id: order_id.into(),
            policy: ReconnectPolicy::default(),
        }
    }

    /// Set the reconnect policy
    pub fn policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Result of a `subscribe` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// Subscribe frame was sent on the live connection
    Sent,
    /// Topic recorded; the frame goes out on the next successful open
    Deferred,
}

/// Inbound message envelope: `{"type": ..., "data": ...}`
///
/// Closed union over the server message kinds. An unrecognized `type`
/// deserializes to `Unknown`; it is dropped, not an error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InboundMessage {
    #[serde(rename = "ORDER_UPDATE")]
    OrderUpdate(OrderUpdateData),
    #[serde(rename = "LOCATION")]
    Location(LocationData),
    #[serde(rename = "ERROR")]
    Error(ErrorData),
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    /// Parse a raw text frame
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        // The derived adjacently-tagged deserializer rejects unknown tags
        // that carry a `data` payload (`#[serde(other)]` only admits unit
        // content), so route unrecognized tags to `Unknown` here.
        let value: serde_json::Value = serde_json::from_str(text)?;
        match value.get("type").and_then(serde_json::Value::as_str) {
            Some("ORDER_UPDATE" | "LOCATION" | "ERROR") | None => serde_json::from_value(value),
            Some(_) => Ok(Self::Unknown),
        }
    }
}

/// Payload of an `ORDER_UPDATE` message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderUpdateData {
    /// Current order status code, e.g. `IN_TRANSIT`
    pub status: String,
    /// Human-readable status description
    #[serde(default)]
    pub description: String,
    /// Server-side update time
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Incremental order fields to merge into the cached view
    #[serde(default)]
    pub order: Option<OrderPatch>,
}

/// Incremental order fields carried by an `ORDER_UPDATE`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderPatch {
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

/// Payload of a `LOCATION` message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationData {
    /// Driver latitude in degrees
    pub latitude: f64,
    /// Driver longitude in degrees
    pub longitude: f64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Approximate street address, when the server resolves one
    #[serde(default)]
    pub address: Option<String>,
}

/// Payload of an `ERROR` message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorData {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
}

/// Outbound subscribe frame
#[derive(Debug, Serialize)]
pub struct SubscribeFrame {
    #[serde(rename = "type")]
    kind: &'static str,
    order_id: String,
    timestamp: DateTime<Utc>,
}

impl SubscribeFrame {
    /// Build a subscribe frame for the given order, stamped with the send time
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            kind: "SUBSCRIBE",
            order_id: order_id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Tracking client errors
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Transport could not be opened
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// A frame could not be written to the transport
    #[error("send failed: {0}")]
    SendFailed(String),
    /// The client task has shut down; the handle is stale
    #[error("tracking client is no longer running")]
    ClientClosed,
}
