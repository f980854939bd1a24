//! Delivery API data transfer types

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Order snapshot returned by `GET /orders/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: Uuid,
    #[serde(default)]
    pub tracking_number: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub client: Option<Person>,
    #[serde(default)]
    pub driver: Option<Driver>,
    #[serde(default)]
    pub detail: Option<OrderDetail>,
}

/// A referenced person (client, or the user behind a driver)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Assigned driver and vehicle info
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Driver {
    #[serde(default)]
    pub user: Option<Person>,
    #[serde(default)]
    pub vehicle_model: Option<String>,
    #[serde(default)]
    pub vehicle_color: Option<String>,
}

/// Pickup/delivery addresses in their pre-formatted form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderDetail {
    #[serde(default)]
    pub pickup_address: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
}

impl Driver {
    /// "model color" string when any vehicle info exists
    pub fn vehicle_info(&self) -> Option<String> {
        let model = self.vehicle_model.as_deref().unwrap_or("");
        let color = self.vehicle_color.as_deref().unwrap_or("");
        let joined = format!("{} {}", model, color);
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
