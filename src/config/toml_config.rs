use crate::domain::model::Spot;
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk forecast configuration. Every section is optional; unset values keep their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: Option<SourceConfig>,
    pub forecast: Option<WindowConfig>,
    pub output: Option<OutputConfig>,
    #[serde(default)]
    pub spots: Vec<Spot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub weather_endpoint: Option<String>,
    pub marine_endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowConfig {
    pub window_hours: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub index_page: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MARINE_ENDPOINT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ForecastError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(source) = &self.source {
            if let Some(endpoint) = &source.weather_endpoint {
                validation::validate_url("source.weather_endpoint", endpoint)?;
            }
            if let Some(endpoint) = &source.marine_endpoint {
                validation::validate_url("source.marine_endpoint", endpoint)?;
            }
            if let Some(concurrent) = source.concurrent_requests {
                validation::validate_positive_number("source.concurrent_requests", concurrent, 1)?;
            }
        }

        if let Some(path) = self.output.as_ref().and_then(|o| o.path.as_deref()) {
            validation::validate_path("output.path", path)?;
        }

        for (i, spot) in self.spots.iter().enumerate() {
            let prefix = format!("spots[{}]", i);
            validation::validate_non_empty_string(&format!("{}.name", prefix), &spot.name)?;
            validation::validate_coordinates(&prefix, spot.latitude, spot.longitude)?;
        }

        Ok(())
    }
}
