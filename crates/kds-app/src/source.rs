//! Order source selection: the real API client, or the simulated kitchen
//! when demo mode asks for it.

use std::time::Duration;

use async_trait::async_trait;
use kds_board::config::Config;
use kds_client::KitchenClient;
use kds_types::domain::order::{Order, OrderStatus};
use kds_types::ports::order_source::{OrderSource, SourceError};
use uuid::Uuid;

pub enum BoardSource {
    Http(KitchenClient),
    #[cfg(feature = "sim")]
    Sim(kds_sim::SimKitchen),
}

pub fn build_source(config: &Config) -> anyhow::Result<BoardSource> {
    if config.demo {
        #[cfg(feature = "sim")]
        {
            tracing::info!("demo mode: serving orders from the simulated kitchen");
            return Ok(BoardSource::Sim(kds_sim::SimKitchen::new()));
        }
        #[cfg(not(feature = "sim"))]
        {
            anyhow::bail!("KDS_DEMO is set but this binary was built without the `sim` feature");
        }
    }

    let mut builder =
        KitchenClient::builder(&config.api_url)?.with_timeout(Duration::from_secs(10));
    if let Some(token) = &config.api_token {
        builder = builder.with_bearer_token(token)?;
    }
    Ok(BoardSource::Http(builder.build()?))
}

#[async_trait]
impl OrderSource for BoardSource {
    async fn fetch_orders(&self, limit: usize) -> Result<Vec<Order>, SourceError> {
        match self {
            BoardSource::Http(client) => client.fetch_orders(limit).await,
            #[cfg(feature = "sim")]
            BoardSource::Sim(kitchen) => kitchen.fetch_orders(limit).await,
        }
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, SourceError> {
        match self {
            BoardSource::Http(client) => client.update_status(id, status).await,
            #[cfg(feature = "sim")]
            BoardSource::Sim(kitchen) => kitchen.update_status(id, status).await,
        }
    }
}
