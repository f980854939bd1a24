//! Track command implementation

use crate::api::{ApiClientConfig, DeliveryApi, HttpDeliveryApi};
use crate::config::Config;
use crate::order::OrderView;
use crate::tracking::{codes, LocationData, OrderTracker, OrderUpdateData, TrackingObserver};
use clap::Args;
use uuid::Uuid;

#[derive(Args, Debug)]
pub struct TrackArgs {
    /// Order id to follow
    pub order_id: Uuid,

    /// Skip the initial order snapshot fetch and rely on live updates only
    #[arg(long)]
    pub skip_fetch: bool,
}

impl TrackArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut view = OrderView::new(self.order_id.to_string());

        if !self.skip_fetch {
            let api = HttpDeliveryApi::new(ApiClientConfig::new(
                config.api.base_url.as_str(),
                config.api.auth_token.as_str(),
            ))?;
            match api.order(&self.order_id).await {
                Ok(order) => {
                    tracing::info!(
                        status = %order.status,
                        tracking_number = ?order.tracking_number,
                        "Loaded order snapshot"
                    );
                    view = OrderView::from_order(&order);
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Could not load order snapshot, continuing with live updates only"
                    );
                }
            }
        }

        let tracker = OrderTracker::new(
            config.tracker_config(self.order_id.to_string()),
            ConsoleObserver { view },
        );
        tracker.connect()?;

        tracing::info!("Tracking order, press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;

        tracker.disconnect()?;
        Ok(())
    }
}

/// Observer that keeps the cached view current and logs every event
struct ConsoleObserver {
    view: OrderView,
}

impl TrackingObserver for ConsoleObserver {
    fn on_open(&mut self) {
        tracing::info!("Live tracking connected");
    }

    fn on_close(&mut self) {
        tracing::info!("Live tracking disconnected");
    }

    fn on_error(&mut self, code: &str, message: &str) {
        match code {
            codes::RECONNECTING => tracing::warn!(reason = message, "Reconnecting"),
            codes::RECONNECT_FAILED => {
                tracing::error!("Live tracking gave up reconnecting; restart to resume")
            }
            _ => tracing::warn!(code, reason = message, "Tracking error"),
        }
    }

    fn on_order_update(&mut self, data: &OrderUpdateData) {
        self.view.apply_update(data);
        tracing::info!(
            status = %self.view.raw_status,
            progress = self.view.progress(),
            description = self.view.description.as_deref().unwrap_or("-"),
            driver = self.view.driver_name.as_deref().unwrap_or("unassigned"),
            "Order update"
        );
    }

    fn on_location_update(&mut self, data: &LocationData) {
        self.view.apply_location(data);
        tracing::info!(
            latitude = data.latitude,
            longitude = data.longitude,
            "Driver location"
        );
    }
}
