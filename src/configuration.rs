use std::path::PathBuf;
use std::time::Duration;

use crate::cli_args::Commands;

/// Identity stamped into every envelope header: generator name/version and
/// the upload key announced to the sink.
#[derive(Debug, Clone)]
pub struct GeneratorIdentity {
    pub name: String,
    pub version: String,
    pub upload_key: String,
}

#[derive(Debug, Clone)]
pub struct BridgeConfiguration {
    pub upstream_url: String,
    pub conquerable_stations_url: String,
    pub sink_url: String,
    pub station_seed_file: PathBuf,
    pub max_fetch_in_flight: usize,
    pub fetch_interval: Duration,
    pub poster_pool_size: usize,
    pub poster_stagger: Duration,
    pub identity: GeneratorIdentity,
}

impl BridgeConfiguration {
    pub fn new(command: Commands) -> Self {
        match command {
            Commands::RunBridge {
                upstream_url,
                conquerable_stations_url,
                sink_url,
                station_seed_file,
                max_fetch_in_flight,
                fetch_interval_ms,
                poster_pool_size,
                poster_stagger_ms,
                generator_name,
                generator_version,
                upload_key,
            } => Self {
                upstream_url,
                conquerable_stations_url,
                sink_url,
                station_seed_file,
                max_fetch_in_flight,
                fetch_interval: Duration::from_millis(fetch_interval_ms),
                poster_pool_size,
                poster_stagger: Duration::from_millis(poster_stagger_ms),
                identity: GeneratorIdentity {
                    name: generator_name,
                    version: generator_version,
                    upload_key,
                },
            },
        }
    }
}
