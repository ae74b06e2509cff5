use crate::core::{LoadSummary, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<LoadSummary> {
        tracing::info!("Starting forecast run...");
        self.monitor.log_stats("Start");

        // Extract
        let observations = self.pipeline.extract().await?;
        tracing::info!("Fetched forecasts for {} spots", observations.len());
        self.monitor.log_stats("Extract");

        // Transform
        let result = self.pipeline.transform(observations).await?;
        let hours: usize = result.forecasts.iter().map(|f| f.rows.len()).sum();
        tracing::info!("Merged {} forecast hours", hours);
        self.monitor.log_stats("Transform");

        // Load
        let summary = self.pipeline.load(result).await?;
        tracing::info!(
            "Pages in {}: {} written, {} unchanged",
            summary.output_path,
            summary.written.len(),
            summary.unchanged.len()
        );
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(summary)
    }
}
