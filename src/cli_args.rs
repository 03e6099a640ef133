use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// runs the bridge
    RunBridge {
        #[arg(long, env("UPSTREAM_URL"), default_value = "https://public-crest.eveonline.com/")]
        upstream_url: String,

        #[arg(
            long,
            env("CONQUERABLE_STATIONS_URL"),
            default_value = "https://api.eveonline.com/eve/ConquerableStationList.xml.aspx"
        )]
        conquerable_stations_url: String,

        #[arg(long, env("SINK_URL"), default_value = "http://upload.eve-emdr.com/upload/")]
        sink_url: String,

        /// tab-delimited stationID/solarSystemID seed records
        #[arg(long, env("STATION_SEED_FILE"), default_value = "stations")]
        station_seed_file: PathBuf,

        #[arg(long, env("MAX_FETCH_IN_FLIGHT"), default_value_t = 25)]
        max_fetch_in_flight: usize,

        #[arg(long, env("FETCH_INTERVAL_MS"), default_value_t = 33)]
        fetch_interval_ms: u64,

        #[arg(long, env("POSTER_POOL_SIZE"), default_value_t = 11)]
        poster_pool_size: usize,

        #[arg(long, env("POSTER_STAGGER_MS"), default_value_t = 500)]
        poster_stagger_ms: u64,

        #[arg(long, env("GENERATOR_NAME"), default_value = "EveData.Org")]
        generator_name: String,

        #[arg(long, env("GENERATOR_VERSION"), default_value = "0.025a")]
        generator_version: String,

        #[arg(long, env("UPLOAD_KEY"), default_value = "TheCheeseIsBree")]
        upload_key: String,
    },
}
