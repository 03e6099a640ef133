pub mod catalog;
pub mod cli_args;
pub mod configuration;
pub mod crest_client;
pub mod market_model;
pub mod poster;
pub mod reqwest_helpers;
pub mod scheduler;
pub mod station_directory;
pub mod uudif;

extern crate serde;
