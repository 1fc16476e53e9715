use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use kds_types::domain::order::{Order, OrderStatus};
use kds_types::ports::order_source::{OrderSource, SourceError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod events;

#[derive(Clone)]
pub struct KitchenClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

/// HTTP adapter for the orders API.
#[derive(Clone)]
pub struct KitchenClient {
    base: Url,
    client: reqwest::Client,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct UpdateStatusRequest {
    status: OrderStatus,
}

/// Rejection payload the API uses: `{"error": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl KitchenClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<KitchenClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        Ok(KitchenClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
        })
    }

    fn url(&self, path: &str) -> Result<Url, SourceError> {
        self.base
            .join(path)
            .map_err(|e| SourceError::Transport(e.to_string()))
    }

    /// Map a non-success response into the board's error taxonomy. 401 is
    /// the expired-session path; anything else carries the server's message
    /// when the body has the usual `{"error": ...}` shape.
    async fn reject(res: reqwest::Response) -> SourceError {
        let status = res.status();
        if status == StatusCode::UNAUTHORIZED {
            return SourceError::Unauthorized;
        }
        let message = match res.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("server returned {status}"),
        };
        SourceError::Rejected(message)
    }
}

#[async_trait]
impl OrderSource for KitchenClient {
    async fn fetch_orders(&self, limit: usize) -> Result<Vec<Order>, SourceError> {
        let res = self
            .client
            .get(self.url("orders")?)
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            return Err(Self::reject(res).await);
        }
        res.json()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, SourceError> {
        tracing::debug!(order = %id, status = ?status, "requesting status change");
        let res = self
            .client
            .patch(self.url(&format!("orders/{id}/status"))?)
            .json(&UpdateStatusRequest { status })
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            return Err(Self::reject(res).await);
        }
        res.json()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))
    }
}

impl KitchenClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Bearer token every request carries. Stored in the client's default
    /// headers so each call picks it up without threading it through.
    pub fn with_bearer_token(mut self, token: &str) -> anyhow::Result<Self> {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .context("token is not a valid header value")?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    pub fn build(self) -> anyhow::Result<KitchenClient> {
        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("could not build http client")?;
        Ok(KitchenClient {
            base: self.base,
            client,
        })
    }
}
