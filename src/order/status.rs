//! Delivery order status taxonomy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Accepted,
    PickedUp,
    InWarehouse,
    InTransit,
    Delivered,
    Completed,
    Cancelled,
    Returned,
    Lost,
}

impl OrderStatus {
    /// Delivery progress for this status as a percentage
    pub fn progress(&self) -> u8 {
        match self {
            OrderStatus::Pending => 10,
            OrderStatus::Accepted => 25,
            OrderStatus::PickedUp => 50,
            OrderStatus::InWarehouse => 60,
            OrderStatus::InTransit => 75,
            OrderStatus::Delivered => 90,
            OrderStatus::Completed => 100,
            OrderStatus::Cancelled | OrderStatus::Returned | OrderStatus::Lost => 0,
        }
    }

    /// Human-readable description of the status
    pub fn description(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Your order is pending confirmation",
            OrderStatus::Accepted => "Your order has been accepted",
            OrderStatus::PickedUp => "The driver has picked up your order",
            OrderStatus::InWarehouse => "Your order is at the warehouse",
            OrderStatus::InTransit => "Your order is on the way",
            OrderStatus::Delivered => "Your order has been delivered",
            OrderStatus::Completed => "Your order is complete",
            OrderStatus::Cancelled => "Your order has been cancelled",
            OrderStatus::Returned => "Your order has been returned",
            OrderStatus::Lost => "Your order has been lost",
        }
    }

    /// Whether no further updates are expected
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed
                | OrderStatus::Cancelled
                | OrderStatus::Returned
                | OrderStatus::Lost
        )
    }

    /// Wire representation, e.g. `IN_TRANSIT`
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::PickedUp => "PICKED_UP",
            OrderStatus::InWarehouse => "IN_WAREHOUSE",
            OrderStatus::InTransit => "IN_TRANSIT",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Returned => "RETURNED",
            OrderStatus::Lost => "LOST",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "ACCEPTED" => Ok(OrderStatus::Accepted),
            "PICKED_UP" => Ok(OrderStatus::PickedUp),
            "IN_WAREHOUSE" => Ok(OrderStatus::InWarehouse),
            "IN_TRANSIT" => Ok(OrderStatus::InTransit),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            "RETURNED" => Ok(OrderStatus::Returned),
            "LOST" => Ok(OrderStatus::Lost),
            _ => Err(()),
        }
    }
}
