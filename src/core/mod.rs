pub mod dry_run;
pub mod etl;
pub mod merge;
pub mod metrics;
pub mod pipeline;
pub mod render;

pub use crate::domain::model::{
    ForecastRow, LoadSummary, Spot, SpotForecast, SpotObservations, TransformResult,
};
pub use crate::domain::ports::{ConfigProvider, ForecastSource, Pipeline, Storage};
pub use crate::utils::error::Result;
