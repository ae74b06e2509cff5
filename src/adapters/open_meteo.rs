use crate::domain::model::{MarineSample, Spot, SpotObservations, WeatherSample};
use crate::domain::ports::{ConfigProvider, ForecastSource};
use crate::utils::error::{ForecastError, Result};
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use url::Url;

pub const DEFAULT_WEATHER_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_MARINE_ENDPOINT: &str = "https://marine-api.open-meteo.com/v1/marine";

const WEATHER_VARIABLES: &str = "windspeed_10m,winddirection_10m,temperature_2m";
const MARINE_VARIABLES: &str = "wave_height,wave_direction,wave_period";

#[derive(Debug, Deserialize)]
struct ApiResponse<H> {
    #[serde(default)]
    utc_offset_seconds: i32,
    hourly: H,
}

#[derive(Debug, Deserialize)]
struct WeatherHourly {
    time: Vec<String>,
    #[serde(default)]
    windspeed_10m: Vec<Option<f64>>,
    #[serde(default)]
    winddirection_10m: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct MarineHourly {
    time: Vec<String>,
    #[serde(default)]
    wave_height: Vec<Option<f64>>,
    #[serde(default)]
    wave_direction: Vec<Option<f64>>,
    #[serde(default)]
    wave_period: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: String,
}

/// Client for the Open-Meteo forecast and marine APIs.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    weather_endpoint: String,
    marine_endpoint: String,
    timeout: Duration,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl OpenMeteoClient {
    pub fn new(weather_endpoint: impl Into<String>, marine_endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            weather_endpoint: weather_endpoint.into(),
            marine_endpoint: marine_endpoint.into(),
            timeout: Duration::from_secs(30),
            retry_attempts: 0,
            retry_delay: Duration::ZERO,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.weather_endpoint(), config.marine_endpoint())
            .with_timeout(config.request_timeout())
            .with_retry(config.retry_attempts(), config.retry_delay())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    pub fn weather_url(&self, spot: &Spot) -> Result<Url> {
        request_url(&self.weather_endpoint, spot, WEATHER_VARIABLES)
    }

    pub fn marine_url(&self, spot: &Spot) -> Result<Url> {
        request_url(&self.marine_endpoint, spot, MARINE_VARIABLES)
    }

    async fn fetch_weather(&self, spot: &Spot) -> Result<(i32, Vec<WeatherSample>)> {
        let response: ApiResponse<WeatherHourly> = self.get_json(self.weather_url(spot)?).await?;
        let hourly = response.hourly;
        let times = parse_times(&spot.name, &hourly.time)?;
        ensure_len(&spot.name, "windspeed_10m", &hourly.windspeed_10m, times.len())?;
        ensure_len(&spot.name, "winddirection_10m", &hourly.winddirection_10m, times.len())?;
        ensure_len(&spot.name, "temperature_2m", &hourly.temperature_2m, times.len())?;

        let samples = times
            .into_iter()
            .enumerate()
            .map(|(i, time)| WeatherSample {
                time,
                wind_speed: hourly.windspeed_10m[i],
                wind_direction: hourly.winddirection_10m[i],
                air_temp: hourly.temperature_2m[i],
            })
            .collect();

        Ok((response.utc_offset_seconds, samples))
    }

    async fn fetch_marine(&self, spot: &Spot) -> Result<(i32, Vec<MarineSample>)> {
        let response: ApiResponse<MarineHourly> = self.get_json(self.marine_url(spot)?).await?;
        let hourly = response.hourly;
        let times = parse_times(&spot.name, &hourly.time)?;
        ensure_len(&spot.name, "wave_height", &hourly.wave_height, times.len())?;
        ensure_len(&spot.name, "wave_direction", &hourly.wave_direction, times.len())?;
        ensure_len(&spot.name, "wave_period", &hourly.wave_period, times.len())?;

        let samples = times
            .into_iter()
            .enumerate()
            .map(|(i, time)| MarineSample {
                time,
                wave_height: hourly.wave_height[i],
                wave_direction: hourly.wave_direction[i],
                wave_period: hourly.wave_period[i],
            })
            .collect();

        Ok((response.utc_offset_seconds, samples))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let url = &url;
        let body = retry_transient(self.retry_attempts, self.retry_delay, url.path(), move || {
            self.get_once(url)
        })
        .await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_once(&self, url: &Url) -> Result<String> {
        tracing::debug!("Making API request to: {}", url);
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        // Open-Meteo reports bad parameters as {"error": true, "reason": "..."}
        let reason = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.reason)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());

        Err(ForecastError::ForecastApiError {
            status: status.as_u16(),
            reason,
        })
    }
}

#[async_trait::async_trait]
impl ForecastSource for OpenMeteoClient {
    async fn fetch(&self, spot: &Spot) -> Result<SpotObservations> {
        tracing::debug!(
            "Fetching forecast for {} ({}, {})",
            spot.name,
            spot.latitude,
            spot.longitude
        );

        let ((utc_offset_seconds, weather), (_, marine)) =
            tokio::try_join!(self.fetch_weather(spot), self.fetch_marine(spot))?;

        tracing::debug!(
            "{}: {} weather samples, {} marine samples",
            spot.name,
            weather.len(),
            marine.len()
        );

        Ok(SpotObservations {
            spot: spot.clone(),
            utc_offset_seconds,
            weather,
            marine,
        })
    }
}

/// Runs `op` again after `delay` while it fails with a retryable error, at most `attempts` extra times.
pub(crate) async fn retry_transient<T, Fut, Op>(
    attempts: u32,
    delay: Duration,
    label: &str,
    mut op: Op,
) -> Result<T>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < attempts => {
                attempt += 1;
                tracing::warn!(
                    "⚠️ Request to {} failed ({}), retry {}/{}",
                    label,
                    e,
                    attempt,
                    attempts
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

fn request_url(endpoint: &str, spot: &Spot, variables: &str) -> Result<Url> {
    Url::parse_with_params(
        endpoint,
        &[
            ("latitude", spot.latitude.to_string()),
            ("longitude", spot.longitude.to_string()),
            ("hourly", variables.to_string()),
            ("timezone", "auto".to_string()),
        ],
    )
    .map_err(|e| ForecastError::InvalidConfigValueError {
        field: "endpoint".to_string(),
        value: endpoint.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

fn parse_times(spot: &str, raw: &[String]) -> Result<Vec<NaiveDateTime>> {
    raw.iter()
        .map(|s| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
                .map_err(|e| ForecastError::DataError {
                    spot: spot.to_string(),
                    message: format!("invalid timestamp '{}': {}", s, e),
                })
        })
        .collect()
}

fn ensure_len<T>(spot: &str, variable: &str, values: &[T], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(ForecastError::DataError {
            spot: spot.to_string(),
            message: format!(
                "{} has {} values for {} timestamps",
                variable,
                values.len(),
                expected
            ),
        });
    }
    Ok(())
}
