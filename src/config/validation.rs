//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (runtime > 0, link cap > 0)
//! - Check addresses and levels parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AnalyzerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AnalyzerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("log_level '{0}' is not one of trace, debug, info, warn, error")]
    LogLevel(String),
}

pub fn validate_config(config: &AnalyzerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.limits.max_runtime_secs == 0 {
        errors.push(ValidationError::Zero { field: "limits.max_runtime_secs" });
    }
    if config.limits.max_links == 0 {
        errors.push(ValidationError::Zero { field: "limits.max_links" });
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "limits.max_body_bytes" });
    }
    if config.client.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "client.connect_timeout_secs" });
    }
    if config.client.user_agent.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "client.user_agent" });
    }
    if config.storage.save_dir.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "storage.save_dir" });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AnalyzerConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = AnalyzerConfig::default();
        config.limits.max_runtime_secs = 0;
        config.limits.max_links = 0;
        config.observability.log_level = "loud".to_string();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero { field: "limits.max_runtime_secs" }));
        assert!(errors.contains(&ValidationError::MetricsAddress("nowhere".to_string())));
    }
}
