use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Forecast API returned {status}: {reason}")]
    ForecastApiError { status: u16, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Unexpected forecast data for {spot}: {message}")]
    DataError { spot: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Io,
    Rendering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ForecastError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::ForecastApiError { .. } => ErrorCategory::Network,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::SerializationError(_) | Self::DataError { .. } | Self::ProcessingError { .. } => {
                ErrorCategory::Data
            }
            Self::IoError(_) => ErrorCategory::Io,
            Self::TemplateError(_) => ErrorCategory::Rendering,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        if self.is_retryable() {
            return ErrorSeverity::Medium;
        }
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Data | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Io | ErrorCategory::Rendering => ErrorSeverity::Critical,
        }
    }

    /// Timeouts, connection failures, throttling and upstream 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
            }
            Self::ForecastApiError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check network access to the Open-Meteo endpoints and retry; the service may be temporarily unavailable"
            }
            ErrorCategory::Configuration => {
                "Review the CLI flags and the TOML config file (spots, endpoints, output path)"
            }
            ErrorCategory::Data => {
                "The forecast response did not have the expected shape; verify the endpoint and requested variables"
            }
            ErrorCategory::Io => "Make sure the output directory exists and is writable",
            ErrorCategory::Rendering => "Check the page templates compiled into the binary",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(e) if e.is_timeout() => {
                "The forecast service did not answer in time".to_string()
            }
            Self::ApiError(_) => "Could not reach the forecast service".to_string(),
            Self::ForecastApiError { status, reason } => {
                format!("The forecast service rejected the request ({}): {}", status, reason)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            Self::DataError { spot, message } => {
                format!("Forecast data for {} could not be used: {}", spot, message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_errors_are_retryable() {
        let err = ForecastError::ForecastApiError {
            status: 503,
            reason: "Service Unavailable".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let throttled = ForecastError::ForecastApiError {
            status: 429,
            reason: "Too Many Requests".to_string(),
        };
        assert!(throttled.is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let err = ForecastError::ForecastApiError {
            status: 400,
            reason: "Latitude must be in range of -90 to 90°".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("Latitude"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = ForecastError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_config_errors_carry_field() {
        let err = ForecastError::InvalidConfigValueError {
            field: "window_hours".to_string(),
            value: "0".to_string(),
            reason: "Value must be between 1 and 384".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.user_friendly_message().contains("window_hours"));
    }
}
