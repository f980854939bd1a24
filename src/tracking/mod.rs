//! Real-time order tracking subscription client
//!
//! The core of the crate: a WebSocket subscription client that authenticates
//! via a token in the connection URL, subscribes to one order's updates, and
//! automatically re-establishes the connection after non-clean closes with
//! bounded exponential backoff.

mod client;
mod endpoint;
mod transport;
mod types;

pub use client::{OrderTracker, TrackerStatus, TrackingObserver};
pub use endpoint::tracking_url;
pub use transport::{Connection, Connector, OutboundFrame, TransportEvent, WsConnector};
pub use types::{
    codes, ConnectionState, ErrorData, InboundMessage, LocationData, OrderPatch, OrderUpdateData,
    ReconnectPolicy, SubscribeFrame, SubscribeOutcome, TrackerConfig, TrackerError,
};
