//! Simulate command implementation

use crate::api::{ApiClientConfig, DeliveryApi, HttpDeliveryApi};
use crate::config::Config;
use clap::{Args, ValueEnum};
use uuid::Uuid;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Order id to simulate
    pub order_id: Uuid,

    /// Which simulation action to trigger
    #[arg(value_enum, default_value_t = SimAction::Full)]
    pub action: SimAction,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SimAction {
    /// Full delivery simulation: the order progresses automatically
    Full,
    /// Assign a random available driver
    AssignDriver,
    /// Simulated driver movement only
    Movement,
}

impl SimulateArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let api = HttpDeliveryApi::new(ApiClientConfig::new(
            config.api.base_url.as_str(),
            config.api.auth_token.as_str(),
        ))?;

        match self.action {
            SimAction::Full => {
                api.start_simulation(&self.order_id).await?;
                tracing::info!(order_id = %self.order_id, "Delivery simulation started");
            }
            SimAction::AssignDriver => {
                api.assign_random_driver(&self.order_id).await?;
                tracing::info!(order_id = %self.order_id, "Driver assigned");
            }
            SimAction::Movement => {
                api.simulate_movement(&self.order_id).await?;
                tracing::info!(order_id = %self.order_id, "Movement simulation started");
            }
        }

        Ok(())
    }
}
