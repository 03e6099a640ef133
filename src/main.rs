use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{event, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crest_emdr_bridge::catalog;
use crest_emdr_bridge::cli_args::Cli;
use crest_emdr_bridge::configuration::BridgeConfiguration;
use crest_emdr_bridge::crest_client::{CrestApi, CrestClient};
use crest_emdr_bridge::poster::spawn_poster_pool;
use crest_emdr_bridge::reqwest_helpers::create_client;
use crest_emdr_bridge::scheduler::FetchScheduler;
use crest_emdr_bridge::station_directory::StationDirectory;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cfg = BridgeConfiguration::new(args.command);

    let client = CrestClient::try_new(create_client(), &cfg.upstream_url, &cfg.conquerable_stations_url)?;

    let catalog = catalog::load_catalog(&client)
        .await
        .context("Failed to load the market catalog")?;

    let mut stations = StationDirectory::load_seed_file(&cfg.station_seed_file)?;
    match client.get_conquerable_stations().await {
        Ok(rows) => stations.merge_conquerable_stations(&rows),
        Err(e) => {
            event!(
                Level::WARN,
                "Conquerable station list unavailable, continuing with seed stations only: {:#}",
                e
            );
        }
    }

    let (envelope_tx, envelope_rx) = tokio::sync::mpsc::channel::<Vec<u8>>(1);

    spawn_poster_pool(cfg.sink_url.clone(), cfg.poster_pool_size, cfg.poster_stagger, envelope_rx);

    let scheduler = FetchScheduler::new(
        Arc::new(client),
        catalog,
        Arc::new(stations),
        cfg.identity.clone(),
        envelope_tx,
        cfg.max_fetch_in_flight,
        cfg.fetch_interval,
    )?;

    scheduler.run().await
}
