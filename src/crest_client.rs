use std::any::type_name;

use anyhow::{Context, Result};
use async_trait::async_trait;
use mockall::automock;
use reqwest::Url;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::market_model::{ConquerableStationList, ConquerableStationRow, MarketHistory, MarketOrders, MarketTypesPage, RegionsPage};

/// Which side of the order book to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

/// The upstream surface the pipeline depends on. A trait so the catalog
/// loader and the scheduler can run against in-memory fakes in tests.
#[automock]
#[async_trait]
pub trait CrestApi: Send + Sync {
    async fn get_regions(&self) -> Result<RegionsPage>;

    /// URL of the first market types page; later pages come from `next.href`.
    fn market_types_url(&self) -> String;

    async fn get_market_types_page(&self, url: &str) -> Result<MarketTypesPage>;

    async fn get_market_history(&self, region_id: i64, type_id: i64) -> Result<MarketHistory>;

    async fn get_market_orders(&self, side: OrderSide, region_id: i64, type_id: i64) -> Result<MarketOrders>;

    async fn get_conquerable_stations(&self) -> Result<Vec<ConquerableStationRow>>;
}

#[derive(Debug, Clone)]
pub struct CrestClient {
    client: ClientWithMiddleware,
    base_url: Url,
    conquerable_stations_url: String,
}

impl CrestClient {
    /// Creates a new CrestClient. `base_url` needs a trailing '/'; one is
    /// inserted if necessary.
    pub fn try_new(client: ClientWithMiddleware, base_url: &str, conquerable_stations_url: &str) -> Result<Self> {
        let with_trailing_slash = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&with_trailing_slash).with_context(|| format!("Invalid upstream base url '{}'", with_trailing_slash))?;

        Ok(CrestClient {
            client,
            base_url,
            conquerable_stations_url: conquerable_stations_url.to_string(),
        })
    }

    async fn make_api_call<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let resp = request.send().await.context("Failed to send request")?;

        let status = resp.status();
        let body = resp.text().await.context("Failed to get response body")?;

        // only a plain 200 carries a usable payload
        if status != reqwest::StatusCode::OK {
            anyhow::bail!("API request failed. Status: {}, Body: {}", status, body);
        }

        serde_json::from_str(&body).map_err(|e| {
            anyhow::anyhow!(
                "Error decoding response for type {}: '{:?}'. Response body was: '{}'",
                type_name::<T>(),
                e,
                body
            )
        })
    }
}

#[async_trait]
impl CrestApi for CrestClient {
    async fn get_regions(&self) -> Result<RegionsPage> {
        Self::make_api_call(self.client.get(format!("{}regions/", self.base_url))).await
    }

    fn market_types_url(&self) -> String {
        format!("{}market/types/", self.base_url)
    }

    async fn get_market_types_page(&self, url: &str) -> Result<MarketTypesPage> {
        Self::make_api_call(self.client.get(url)).await
    }

    async fn get_market_history(&self, region_id: i64, type_id: i64) -> Result<MarketHistory> {
        let url = format!("{}market/{}/types/{}/history/", self.base_url, region_id, type_id);
        Self::make_api_call(self.client.get(url)).await
    }

    async fn get_market_orders(&self, side: OrderSide, region_id: i64, type_id: i64) -> Result<MarketOrders> {
        let url = format!(
            "{base}market/{region_id}/orders/{side}/?type={base}types/{type_id}/",
            base = self.base_url,
            region_id = region_id,
            side = side.as_path_segment(),
            type_id = type_id,
        );
        Self::make_api_call(self.client.get(url)).await
    }

    async fn get_conquerable_stations(&self) -> Result<Vec<ConquerableStationRow>> {
        let resp = self
            .client
            .get(self.conquerable_stations_url.as_str())
            .send()
            .await
            .context("Failed to fetch the conquerable station list")?;

        let status = resp.status();
        let body = resp.text().await.context("Failed to read the conquerable station list body")?;

        if !status.is_success() {
            anyhow::bail!("Conquerable station request failed. Status: {}, Body: {}", status, body);
        }

        let list: ConquerableStationList = quick_xml::de::from_str(&body).context("Error decoding the conquerable station XML")?;
        Ok(list.result.rowset.rows)
    }
}
