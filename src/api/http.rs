//! HTTP implementation of the delivery API client

use super::{DeliveryApi, Order};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use uuid::Uuid;

/// Configuration for the HTTP API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL, e.g. `http://localhost:7319/api/v1`
    pub base_url: String,
    /// Bearer token sent on every request
    pub auth_token: String,
    /// Request timeout
    pub timeout: Duration,
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Delivery backend client over reqwest
pub struct HttpDeliveryApi {
    config: ApiClientConfig,
    client: Client,
}

impl HttpDeliveryApi {
    /// Create a client with the given configuration
    pub fn new(config: ApiClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_action(&self, path: &str) -> anyhow::Result<()> {
        let url = self.url(path);
        tracing::debug!(url = %url, "POST");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.auth_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("delivery API error: {} - {}", status, body);
        }

        Ok(())
    }
}

#[async_trait]
impl DeliveryApi for HttpDeliveryApi {
    async fn order(&self, order_id: &Uuid) -> anyhow::Result<Order> {
        let url = self.url(&format!("/orders/{}", order_id));
        tracing::debug!(url = %url, "Fetching order");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.auth_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("delivery API error: {} - {}", status, body);
        }

        Ok(response.json().await?)
    }

    async fn start_simulation(&self, order_id: &Uuid) -> anyhow::Result<()> {
        self.post_action(&format!("/orders/{}/simulate", order_id))
            .await
    }

    async fn assign_random_driver(&self, order_id: &Uuid) -> anyhow::Result<()> {
        self.post_action(&format!("/orders/{}/assign-driver", order_id))
            .await
    }

    async fn simulate_movement(&self, order_id: &Uuid) -> anyhow::Result<()> {
        self.post_action(&format!("/orders/{}/simulate-movement", order_id))
            .await
    }
}
