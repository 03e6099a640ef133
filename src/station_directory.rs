use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{event, Level};

use crate::market_model::ConquerableStationRow;

/// Station to solar-system mapping. Populated once during startup, read-only
/// afterwards, so lookups need no locking.
#[derive(Debug, Default)]
pub struct StationDirectory {
    stations: HashMap<i64, i64>,
}

impl StationDirectory {
    /// Loads the seed file of static stations: one `stationID\tsolarSystemID`
    /// record per line, no header. A missing file or malformed record is an
    /// error; the service is misconfigured without its seed stations.
    pub fn load_seed_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read station seed file '{}'", path.display()))?;

        let mut stations = HashMap::new();
        for (index, line) in contents.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let (station, system) = line.split_once('\t').with_context(|| {
                format!("Station seed record {} is not tab-delimited: '{}'", index + 1, line)
            })?;
            let station_id: i64 = station
                .trim()
                .parse()
                .with_context(|| format!("Invalid stationID in seed record {}: '{}'", index + 1, station))?;
            let solar_system_id: i64 = system
                .trim()
                .parse()
                .with_context(|| format!("Invalid solarSystemID in seed record {}: '{}'", index + 1, system))?;
            stations.insert(station_id, solar_system_id);
        }

        event!(Level::INFO, "Loaded {} seed stations", stations.len());

        Ok(StationDirectory { stations })
    }

    /// Merges the conquerable station list fetched from the upstream. Merged
    /// last, so the upstream wins where both sources know a station.
    pub fn merge_conquerable_stations(&mut self, rows: &[ConquerableStationRow]) {
        for row in rows {
            self.stations.insert(row.station_id, row.solar_system_id);
        }
        event!(Level::INFO, "Added conquerable stations: {} total stations", self.stations.len());
    }

    pub fn lookup(&self, station_id: i64) -> Option<i64> {
        self.stations.get(&station_id).copied()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
