//! Request/response client for the delivery backend
//!
//! Order lookup plus the demo simulation triggers. The tracking client does
//! not depend on this module; it exists so callers can seed their cached
//! order view and drive simulated deliveries.

mod http;
mod types;

pub use http::{ApiClientConfig, HttpDeliveryApi};
pub use types::{Driver, Order, OrderDetail, Person};

use async_trait::async_trait;
use uuid::Uuid;

/// Delivery backend operations used by the tracking UI layer
#[async_trait]
pub trait DeliveryApi: Send + Sync {
    /// Fetch the current order snapshot
    async fn order(&self, order_id: &Uuid) -> anyhow::Result<Order>;
    /// Kick off the full delivery simulation for an order
    async fn start_simulation(&self, order_id: &Uuid) -> anyhow::Result<()>;
    /// Assign a random available driver
    async fn assign_random_driver(&self, order_id: &Uuid) -> anyhow::Result<()>;
    /// Start simulated driver movement
    async fn simulate_movement(&self, order_id: &Uuid) -> anyhow::Result<()>;
}
