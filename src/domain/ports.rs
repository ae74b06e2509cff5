use crate::domain::model::{LoadSummary, Spot, SpotObservations, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn weather_endpoint(&self) -> &str;
    fn marine_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn spots(&self) -> &[Spot];
    fn window_hours(&self) -> u32;
    fn concurrent_requests(&self) -> usize;
    fn request_timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
    fn write_index(&self) -> bool;
}

/// Source of hourly weather and marine series for a spot.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(&self, spot: &Spot) -> Result<SpotObservations>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SpotObservations>>;
    async fn transform(&self, data: Vec<SpotObservations>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<LoadSummary>;
}
