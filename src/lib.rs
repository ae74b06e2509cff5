pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::OpenMeteoClient;
pub use config::{cli::LocalStorage, ForecastSettings};

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{etl::EtlEngine, pipeline::ForecastPipeline};
pub use domain::model::{LoadSummary, Spot};
pub use utils::error::{ForecastError, Result};
