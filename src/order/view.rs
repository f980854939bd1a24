//! Cached order view maintained from live updates

use super::status::OrderStatus;
use crate::api::Order;
use crate::tracking::{LocationData, OrderUpdateData};

/// The consumer-side picture of one order, kept current by merging
/// incremental `ORDER_UPDATE` and `LOCATION` payloads into the snapshot
/// fetched over the request/response API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderView {
    pub order_id: String,
    pub tracking_number: Option<String>,
    /// Parsed status; `None` when the wire carried a code we don't know
    pub status: Option<OrderStatus>,
    /// Status code exactly as received
    pub raw_status: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub driver_name: Option<String>,
    pub company_name: Option<String>,
    /// Last reported driver position (latitude, longitude)
    pub last_location: Option<(f64, f64)>,
}

impl OrderView {
    /// Empty view for an order id
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            ..Default::default()
        }
    }

    /// Seed the view from an API order snapshot
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id.to_string(),
            tracking_number: order.tracking_number.clone(),
            status: order.status.parse().ok(),
            raw_status: order.status.clone(),
            description: None,
            client_name: order.client.as_ref().and_then(|c| c.full_name.clone()),
            driver_name: order
                .driver
                .as_ref()
                .and_then(|d| d.user.as_ref())
                .and_then(|u| u.full_name.clone()),
            company_name: None,
            last_location: None,
        }
    }

    /// Merge an `ORDER_UPDATE` payload
    ///
    /// Patch fields only ever overwrite when present; absent fields leave
    /// the cached values alone.
    pub fn apply_update(&mut self, update: &OrderUpdateData) {
        self.raw_status = update.status.clone();
        self.status = update.status.parse().ok();
        self.description = if update.description.is_empty() {
            self.status.map(|s| s.description().to_string())
        } else {
            Some(update.description.clone())
        };

        if let Some(patch) = &update.order {
            if patch.driver_name.is_some() {
                self.driver_name = patch.driver_name.clone();
            } else if patch.driver_id.is_some() && self.driver_name.is_none() {
                // A driver exists but the update carried no name yet
                self.driver_name = Some("Assigned driver".to_string());
            }
            if patch.client_name.is_some() {
                self.client_name = patch.client_name.clone();
            }
            if patch.tracking_number.is_some() {
                self.tracking_number = patch.tracking_number.clone();
            }
            if patch.company_name.is_some() {
                self.company_name = patch.company_name.clone();
            }
        }
    }

    /// Record the latest driver position
    pub fn apply_location(&mut self, location: &LocationData) {
        self.last_location = Some((location.latitude, location.longitude));
    }

    /// Delivery progress percentage; unknown statuses report 0
    pub fn progress(&self) -> u8 {
        self.status.map(|s| s.progress()).unwrap_or(0)
    }
}
