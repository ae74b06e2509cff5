pub mod cli;
pub mod toml_config;

use crate::adapters::open_meteo::{DEFAULT_MARINE_ENDPOINT, DEFAULT_WEATHER_ENDPOINT};
use crate::core::ConfigProvider;
use crate::domain::model::Spot;
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{self, Validate};
use std::collections::HashSet;
use std::time::Duration;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};

/// Open-Meteo serves at most 16 days of hourly data.
pub const MAX_WINDOW_HOURS: u32 = 384;

const RESERVED_SLUGS: [&str; 1] = ["index"];

fn webcam_iframe(id: u32) -> String {
    format!(
        r#"<iframe src="https://in2thebeach.es/callbacks/camviewer_ext2.php?id={}" scrolling="no"></iframe>"#,
        id
    )
}

pub fn default_spots() -> Vec<Spot> {
    vec![
        Spot::new("Las Palmas", 28.1272, -15.4314).with_webcam(webcam_iframe(57)),
        Spot::new("Telde", 27.9924, -15.4192).with_webcam(webcam_iframe(43)),
        Spot::new("Arguineguín", 27.7581, -15.6835).with_webcam(webcam_iframe(71)),
    ]
}

/// Fully resolved settings: built-in defaults, then the TOML file, then CLI flags.
#[derive(Debug, Clone)]
pub struct ForecastSettings {
    pub weather_endpoint: String,
    pub marine_endpoint: String,
    pub output_path: String,
    pub spots: Vec<Spot>,
    pub window_hours: u32,
    pub concurrent_requests: usize,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
    pub index_page: bool,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            weather_endpoint: DEFAULT_WEATHER_ENDPOINT.to_string(),
            marine_endpoint: DEFAULT_MARINE_ENDPOINT.to_string(),
            output_path: "docs".to_string(),
            spots: default_spots(),
            window_hours: 24,
            concurrent_requests: 3,
            timeout_seconds: 30,
            retry_attempts: 2,
            retry_delay_seconds: 2,
            index_page: true,
        }
    }
}

impl ForecastSettings {
    pub fn apply_toml(&mut self, file: TomlConfig) {
        if let Some(source) = file.source {
            if let Some(v) = source.weather_endpoint {
                self.weather_endpoint = v;
            }
            if let Some(v) = source.marine_endpoint {
                self.marine_endpoint = v;
            }
            if let Some(v) = source.timeout_seconds {
                self.timeout_seconds = v;
            }
            if let Some(v) = source.retry_attempts {
                self.retry_attempts = v;
            }
            if let Some(v) = source.retry_delay_seconds {
                self.retry_delay_seconds = v;
            }
            if let Some(v) = source.concurrent_requests {
                self.concurrent_requests = v;
            }
        }
        if let Some(v) = file.forecast.and_then(|f| f.window_hours) {
            self.window_hours = v;
        }
        if let Some(output) = file.output {
            if let Some(v) = output.path {
                self.output_path = v;
            }
            if let Some(v) = output.index_page {
                self.index_page = v;
            }
        }
        if !file.spots.is_empty() {
            self.spots = file.spots;
        }
    }
}

impl Validate for ForecastSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("weather_endpoint", &self.weather_endpoint)?;
        validation::validate_url("marine_endpoint", &self.marine_endpoint)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_range("window_hours", self.window_hours, 1, MAX_WINDOW_HOURS)?;
        validation::validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;

        if self.spots.is_empty() {
            return Err(ForecastError::ConfigValidationError {
                field: "spots".to_string(),
                message: "at least one spot is required".to_string(),
            });
        }

        let mut slugs = HashSet::new();
        for (i, spot) in self.spots.iter().enumerate() {
            let prefix = format!("spots[{}]", i);
            validation::validate_non_empty_string(&format!("{}.name", prefix), &spot.name)?;
            validation::validate_coordinates(&prefix, spot.latitude, spot.longitude)?;

            if spot.name.contains(['/', '\\']) {
                return Err(ForecastError::InvalidConfigValueError {
                    field: format!("{}.name", prefix),
                    value: spot.name.clone(),
                    reason: "spot names cannot contain path separators".to_string(),
                });
            }

            let slug = spot.slug();
            if RESERVED_SLUGS.contains(&slug.as_str()) || !slugs.insert(slug.clone()) {
                return Err(ForecastError::InvalidConfigValueError {
                    field: format!("{}.name", prefix),
                    value: spot.name.clone(),
                    reason: format!("page name '{}.html' is already taken", slug),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for ForecastSettings {
    fn weather_endpoint(&self) -> &str {
        &self.weather_endpoint
    }

    fn marine_endpoint(&self) -> &str {
        &self.marine_endpoint
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn spots(&self) -> &[Spot] {
        &self.spots
    }

    fn window_hours(&self) -> u32 {
        self.window_hours
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }

    fn write_index(&self) -> bool {
        self.index_page
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "surf-forecast")]
#[command(about = "Fetch surf forecasts and render them as static HTML pages")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory the HTML pages are written to [default: docs]
    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long)]
    pub weather_endpoint: Option<String>,

    #[arg(long)]
    pub marine_endpoint: Option<String>,

    /// Hours of forecast to show, starting now [default: 24]
    #[arg(long)]
    pub window_hours: Option<u32>,

    /// Spots fetched at the same time [default: 3]
    #[arg(long)]
    pub concurrent_requests: Option<usize>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Extra attempts for timeouts and upstream errors [default: 2]
    #[arg(long)]
    pub retry_attempts: Option<u32>,

    /// Do not write index.html
    #[arg(long)]
    pub no_index: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory after each phase")]
    pub monitor: bool,

    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Show the resolved settings and request URLs without fetching anything
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn resolve(&self) -> Result<ForecastSettings> {
        let mut settings = ForecastSettings::default();

        if let Some(path) = &self.config {
            tracing::info!("📁 Loading configuration from: {}", path);
            let file = TomlConfig::from_file(path)?;
            file.validate()?;
            settings.apply_toml(file);
        }

        if let Some(v) = &self.output_path {
            settings.output_path = v.clone();
        }
        if let Some(v) = &self.weather_endpoint {
            settings.weather_endpoint = v.clone();
        }
        if let Some(v) = &self.marine_endpoint {
            settings.marine_endpoint = v.clone();
        }
        if let Some(v) = self.window_hours {
            settings.window_hours = v;
        }
        if let Some(v) = self.concurrent_requests {
            settings.concurrent_requests = v;
        }
        if let Some(v) = self.timeout_seconds {
            settings.timeout_seconds = v;
        }
        if let Some(v) = self.retry_attempts {
            settings.retry_attempts = v;
        }
        if self.no_index {
            settings.index_page = false;
        }

        settings.validate()?;
        Ok(settings)
    }
}
