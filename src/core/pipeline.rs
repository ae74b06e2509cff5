use crate::core::merge::{forecast_window, merge_series};
use crate::core::metrics;
use crate::core::render::{self, INDEX_FILE_NAME};
use crate::core::{
    ConfigProvider, ForecastSource, LoadSummary, Pipeline, SpotForecast, SpotObservations,
    Storage, TransformResult,
};
use crate::utils::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};

/// Fetches every configured spot, merges the series and writes one page per spot.
pub struct ForecastPipeline<S: Storage, C: ConfigProvider, F: ForecastSource> {
    storage: S,
    config: C,
    source: F,
    reference_time: Option<DateTime<Utc>>,
}

impl<S: Storage, C: ConfigProvider, F: ForecastSource> ForecastPipeline<S, C, F> {
    pub fn new(storage: S, config: C, source: F) -> Self {
        Self {
            storage,
            config,
            source,
            reference_time: None,
        }
    }

    /// Pins "now" for the forecast window instead of reading the clock.
    pub fn at(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    /// Writes `content` unless the stored file already holds exactly these bytes.
    async fn write_if_changed(&self, file_name: &str, content: &str) -> Result<bool> {
        match self.storage.read_file(file_name).await {
            Ok(existing) if existing == content.as_bytes() => return Ok(false),
            Ok(_) => {}
            Err(ForecastError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        self.storage.write_file(file_name, content.as_bytes()).await?;
        Ok(true)
    }
}

#[async_trait::async_trait]
impl<S, C, F> Pipeline for ForecastPipeline<S, C, F>
where
    S: Storage,
    C: ConfigProvider,
    F: ForecastSource,
{
    async fn extract(&self) -> Result<Vec<SpotObservations>> {
        let spots = self.config.spots();
        tracing::info!(
            "🌐 Fetching forecasts for {} spots ({} concurrent)",
            spots.len(),
            self.config.concurrent_requests()
        );

        let fetches: Vec<_> = spots.iter().map(|spot| self.source.fetch(spot)).collect();

        // `buffered` keeps results in spot order
        stream::iter(fetches)
            .buffered(self.config.concurrent_requests().max(1))
            .try_collect()
            .await
    }

    async fn transform(&self, data: Vec<SpotObservations>) -> Result<TransformResult> {
        let now = self.reference_time.unwrap_or_else(Utc::now);
        let hours = self.config.window_hours();

        let mut forecasts = Vec::with_capacity(data.len());
        for obs in data {
            let (start, end) = forecast_window(now, obs.utc_offset_seconds, hours)?;
            let mut rows = merge_series(&obs.weather, &obs.marine, start, end);
            rows.iter_mut().for_each(metrics::derive);

            tracing::debug!(
                "{}: {} hourly rows between {} and {}",
                obs.spot.name,
                rows.len(),
                start,
                end
            );
            if rows.is_empty() {
                tracing::warn!("⚠️ No forecast hours for {} in the next {}h", obs.spot.name, hours);
            }

            forecasts.push(SpotForecast {
                spot: obs.spot,
                rows,
            });
        }

        Ok(TransformResult { forecasts })
    }

    async fn load(&self, result: TransformResult) -> Result<LoadSummary> {
        let output_path = self.config.output_path().to_string();
        let mut pages = Vec::with_capacity(result.forecasts.len() + 1);

        // Render everything before touching storage so a template failure writes nothing
        for forecast in &result.forecasts {
            pages.push((
                forecast.spot.page_file_name(),
                render::render_spot_page(forecast)?,
            ));
        }
        if self.config.write_index() {
            let spots: Vec<_> = result.forecasts.iter().map(|f| f.spot.clone()).collect();
            pages.push((INDEX_FILE_NAME.to_string(), render::render_index(&spots)?));
        }

        let mut summary = LoadSummary {
            output_path: output_path.clone(),
            ..Default::default()
        };

        for (file_name, html) in pages {
            if self.write_if_changed(&file_name, &html).await? {
                tracing::info!("✅ Created: {}/{}", output_path, file_name);
                summary.written.push(file_name);
            } else {
                tracing::debug!("Unchanged: {}/{}", output_path, file_name);
                summary.unchanged.push(file_name);
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{MarineSample, Spot, WeatherSample};
    use chrono::{NaiveDate, NaiveDateTime, TimeZone};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files.get(path).map(|b| String::from_utf8_lossy(b).into_owned())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ForecastError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        spots: Vec<Spot>,
        window_hours: u32,
        write_index: bool,
    }

    impl ConfigProvider for MockConfig {
        fn weather_endpoint(&self) -> &str {
            "http://localhost/v1/forecast"
        }

        fn marine_endpoint(&self) -> &str {
            "http://localhost/v1/marine"
        }

        fn output_path(&self) -> &str {
            "docs"
        }

        fn spots(&self) -> &[Spot] {
            &self.spots
        }

        fn window_hours(&self) -> u32 {
            self.window_hours
        }

        fn concurrent_requests(&self) -> usize {
            2
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        fn retry_attempts(&self) -> u32 {
            0
        }

        fn retry_delay(&self) -> Duration {
            Duration::ZERO
        }

        fn write_index(&self) -> bool {
            self.write_index
        }
    }

    /// Serves two hours of data per spot, or fails for spots named "Broken".
    struct FixedSource;

    fn hour(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[async_trait::async_trait]
    impl ForecastSource for FixedSource {
        async fn fetch(&self, spot: &Spot) -> Result<SpotObservations> {
            if spot.name == "Broken" {
                return Err(ForecastError::ForecastApiError {
                    status: 400,
                    reason: "bad spot".to_string(),
                });
            }
            Ok(SpotObservations {
                spot: spot.clone(),
                utc_offset_seconds: 3600,
                weather: (9..12)
                    .map(|h| WeatherSample {
                        time: hour(h),
                        wind_speed: Some(5.0),
                        wind_direction: Some(0.0),
                        air_temp: Some(22.0),
                    })
                    .collect(),
                marine: (10..13)
                    .map(|h| MarineSample {
                        time: hour(h),
                        wave_height: Some(1.0),
                        wave_direction: Some(180.0),
                        wave_period: Some(8.0),
                    })
                    .collect(),
            })
        }
    }

    fn pipeline(
        spots: Vec<Spot>,
        storage: MockStorage,
    ) -> ForecastPipeline<MockStorage, MockConfig, FixedSource> {
        let config = MockConfig {
            spots,
            window_hours: 24,
            write_index: true,
        };
        // 09:00 UTC is 10:00 local, so the 09:00 weather sample falls before the window
        ForecastPipeline::new(storage, config, FixedSource)
            .at(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_extract_keeps_spot_order() {
        let spots = vec![
            Spot::new("Las Palmas", 28.1272, -15.4314),
            Spot::new("Telde", 27.9924, -15.4192),
            Spot::new("Arguineguín", 27.7581, -15.6835),
        ];
        let pipeline = pipeline(spots, MockStorage::default());

        let observations = pipeline.extract().await.unwrap();
        let names: Vec<_> = observations.iter().map(|o| o.spot.name.as_str()).collect();
        assert_eq!(names, vec!["Las Palmas", "Telde", "Arguineguín"]);
    }

    #[tokio::test]
    async fn test_extract_fails_when_any_spot_fails() {
        let spots = vec![Spot::new("Telde", 27.9924, -15.4192), Spot::new("Broken", 0.0, 0.0)];
        let pipeline = pipeline(spots, MockStorage::default());

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, ForecastError::ForecastApiError { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_transform_windows_and_derives() {
        let pipeline = pipeline(vec![Spot::new("Telde", 27.9924, -15.4192)], MockStorage::default());

        let observations = pipeline.extract().await.unwrap();
        let result = pipeline.transform(observations).await.unwrap();
        let rows = &result.forecasts[0].rows;

        let times: Vec<_> = rows.iter().map(|r| r.time).collect();
        assert_eq!(times, vec![hour(10), hour(11), hour(12)]);
        assert_eq!(rows[0].wave_energy, Some(1000.0));
        assert_eq!(rows[0].wave_power_index, Some(8.0));
        assert_eq!(rows[2].wind_speed, None);
    }

    #[tokio::test]
    async fn test_transform_rejects_unrepresentable_window() {
        let config = MockConfig {
            spots: vec![Spot::new("Telde", 27.9924, -15.4192)],
            window_hours: u32::MAX,
            write_index: false,
        };
        let pipeline = ForecastPipeline::new(MockStorage::default(), config, FixedSource)
            .at(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());

        let observations = pipeline.extract().await.unwrap();
        let err = pipeline.transform(observations).await.unwrap_err();
        assert!(matches!(err, ForecastError::ProcessingError { .. }));
    }

    #[tokio::test]
    async fn test_load_skips_unchanged_pages() {
        let storage = MockStorage::default();
        let pipeline = pipeline(vec![Spot::new("Las Palmas", 28.1272, -15.4314)], storage.clone());

        let observations = pipeline.extract().await.unwrap();
        let result = pipeline.transform(observations.clone()).await.unwrap();
        let first = pipeline.load(result).await.unwrap();

        assert_eq!(first.written, vec!["las_palmas.html", "index.html"]);
        assert!(first.unchanged.is_empty());
        assert!(storage
            .get_file("las_palmas.html")
            .await
            .unwrap()
            .contains("Surf Forecast Las Palmas"));

        let result = pipeline.transform(observations).await.unwrap();
        let second = pipeline.load(result).await.unwrap();
        assert!(!second.has_changes());
        assert_eq!(second.unchanged.len(), 2);
    }
}
