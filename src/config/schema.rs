//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the analyzer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the analyzer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Runtime, depth and size limits.
    pub limits: LimitsConfig,

    /// Outgoing HTTP client settings.
    pub client: ClientConfig,

    /// robots.txt gate settings.
    pub robots: RobotsConfig,

    /// Saved analysis settings.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Limits applied to one analysis tree.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Wall-clock budget for the whole tree, in seconds.
    pub max_runtime_secs: u64,

    /// How many link levels below the root to descend.
    pub max_descend_depth: usize,

    /// Maximum links followed from any one resource.
    pub max_links: usize,

    /// Body bytes captured per response; the hash still covers every byte.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_runtime_secs: 60,
            max_descend_depth: 1,
            max_links: 100,
            max_body_bytes: 8 * 1024 * 1024,
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// User-Agent sent with every request; its product token is matched
    /// against robots.txt groups.
    pub user_agent: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Accept-Encoding sent unless the request already carries one.
    pub accept_encoding: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("redcheck/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_secs: 10,
            accept_encoding: "gzip".to_string(),
        }
    }
}

/// robots.txt configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RobotsConfig {
    /// Consult robots.txt before each fetch.
    pub enabled: bool,

    /// How long a parsed robots.txt stays cached, in seconds.
    pub ttl_secs: u64,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 86_400,
        }
    }
}

/// Snapshot storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding saved analyses.
    pub save_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: "saved".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.limits.max_runtime_secs, 60);
        assert_eq!(config.limits.max_descend_depth, 1);
        assert_eq!(config.limits.max_links, 100);
        assert_eq!(config.robots.ttl_secs, 86_400);
        assert!(config.client.user_agent.starts_with("redcheck/"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AnalyzerConfig = toml::from_str(
            r#"
            [limits]
            max_runtime_secs = 5

            [robots]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.max_runtime_secs, 5);
        assert_eq!(config.limits.max_links, 100);
        assert!(!config.robots.enabled);
        assert_eq!(config.storage.save_dir, "saved");
    }
}
