use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tokio::sync::mpsc::Sender;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{event, Level};

use crate::catalog::Catalog;
use crate::configuration::GeneratorIdentity;
use crate::crest_client::{CrestApi, OrderSide};
use crate::market_model::{MarketHistory, MarketOrders};
use crate::station_directory::StationDirectory;
use crate::uudif;

/// Which of the three market artifacts a fetch task is after.
#[derive(Debug, Clone, Copy)]
enum FetchKind {
    History,
    BuyOrders,
    SellOrders,
}

enum Payload {
    History(MarketHistory),
    Orders(MarketOrders),
}

/// Drives the infinite sweep over `regions × types`, dispatching a history,
/// a buy-orders and a sell-orders task per tuple.
///
/// Every dispatch passes two gates in order: the rate gate (one admission per
/// `fetch_interval`, never accumulated) and the fetch semaphore bounding
/// in-flight upstream requests. A fetch task holds its fetch permit until it
/// has either failed (logged, no envelope) or acquired a post permit for its
/// envelope, so a slow sink exhausts post permits and throttles fetching.
pub struct FetchScheduler {
    client: Arc<dyn CrestApi>,
    catalog: Catalog,
    stations: Arc<StationDirectory>,
    identity: GeneratorIdentity,
    envelope_tx: Sender<Vec<u8>>,
    fetch_permits: Arc<Semaphore>,
    post_permits: Arc<Semaphore>,
    rate_gate: DefaultDirectRateLimiter,
}

impl FetchScheduler {
    pub fn new(
        client: Arc<dyn CrestApi>,
        catalog: Catalog,
        stations: Arc<StationDirectory>,
        identity: GeneratorIdentity,
        envelope_tx: Sender<Vec<u8>>,
        max_fetch_in_flight: usize,
        fetch_interval: Duration,
    ) -> Result<Self> {
        let quota = Quota::with_period(fetch_interval).context("Fetch interval must be non-zero")?;

        Ok(FetchScheduler {
            client,
            catalog,
            stations,
            identity,
            envelope_tx,
            fetch_permits: Arc::new(Semaphore::new(max_fetch_in_flight)),
            post_permits: Arc::new(Semaphore::new(max_fetch_in_flight)),
            rate_gate: RateLimiter::direct(quota),
        })
    }

    /// Sweeps forever. Errors only on a closed semaphore, which cannot happen
    /// while the scheduler owns them.
    pub async fn run(&self) -> Result<()> {
        loop {
            for region in &self.catalog.regions {
                event!(Level::INFO, "Scanning region: {}", region.name);
                for item_type in &self.catalog.types {
                    for kind in [FetchKind::History, FetchKind::BuyOrders, FetchKind::SellOrders] {
                        self.rate_gate.until_ready().await;
                        let fetch_permit = Arc::clone(&self.fetch_permits)
                            .acquire_owned()
                            .await
                            .context("Fetch semaphore closed")?;
                        self.spawn_fetch_task(kind, region.region_id, item_type.type_id, fetch_permit);
                    }
                }
            }
        }
    }

    fn spawn_fetch_task(&self, kind: FetchKind, region_id: i64, type_id: i64, fetch_permit: OwnedSemaphorePermit) {
        let client = Arc::clone(&self.client);
        let stations = Arc::clone(&self.stations);
        let identity = self.identity.clone();
        let envelope_tx = self.envelope_tx.clone();
        let post_permits = Arc::clone(&self.post_permits);

        tokio::spawn(async move {
            // holds the fetch permit across the GET and the post-permit handoff
            let _fetch_permit = fetch_permit;

            let result = match kind {
                FetchKind::History => client.get_market_history(region_id, type_id).await.map(Payload::History),
                FetchKind::BuyOrders => client
                    .get_market_orders(OrderSide::Buy, region_id, type_id)
                    .await
                    .map(Payload::Orders),
                FetchKind::SellOrders => client
                    .get_market_orders(OrderSide::Sell, region_id, type_id)
                    .await
                    .map(Payload::Orders),
            };

            let payload = match result {
                Ok(payload) => payload,
                Err(e) => {
                    // no retry; the next sweep revisits this tuple
                    event!(
                        Level::WARN,
                        "{:?} fetch failed for region {} type {}: {:#}",
                        kind,
                        region_id,
                        type_id,
                        e
                    );
                    return;
                }
            };

            let post_permit = match post_permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            tokio::spawn(async move {
                let _post_permit = post_permit;

                let now = Utc::now();
                let envelope = match payload {
                    Payload::History(history) => uudif::history_envelope(&history.items, region_id, type_id, &identity, now),
                    Payload::Orders(orders) => {
                        uudif::orders_envelope(&orders.items, region_id, type_id, &stations, &identity, now)
                    }
                };

                match serde_json::to_vec(&envelope) {
                    Ok(encoded) => {
                        if envelope_tx.send(encoded).await.is_err() {
                            event!(
                                Level::ERROR,
                                "Envelope channel closed, dropping envelope for region {} type {}",
                                region_id,
                                type_id
                            );
                        }
                    }
                    Err(e) => {
                        event!(
                            Level::WARN,
                            "Failed to serialize envelope for region {} type {}: {}",
                            region_id,
                            type_id,
                            e
                        );
                    }
                }
            });
            // the fetch permit drops here, after the post permit is held by the transform task
        });
    }
}
