use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

// ==================================================================================
// SERVICE CONFIG
// ==================================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            environment: default_environment(),
        }
    }
}

// ==================================================================================
// SERVER CONFIG
// ==================================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    #[serde(default)]
    pub shutdown_timeout_secs: Option<u64>,
}

impl ServerSection {
    pub fn shutdown_timeout_secs(&self) -> u64 {
        self.shutdown_timeout_secs
            .unwrap_or_else(default_shutdown_timeout_secs)
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            shutdown_timeout_secs: None,
        }
    }
}

// ==================================================================================
// SCORING CONFIG
// ==================================================================================

/// Bounds for the scoring engine; unset values fall back to defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub history_capacity: Option<usize>,
    #[serde(default)]
    pub over_buffer_capacity: Option<usize>,
    #[serde(default)]
    pub broadcast_capacity: Option<usize>,
}

impl ScoringConfig {
    pub fn history_capacity(&self) -> usize {
        self.history_capacity.unwrap_or_else(default_history_capacity)
    }

    pub fn over_buffer_capacity(&self) -> usize {
        self.over_buffer_capacity
            .unwrap_or_else(default_over_buffer_capacity)
    }

    pub fn broadcast_capacity(&self) -> usize {
        self.broadcast_capacity
            .unwrap_or_else(default_broadcast_capacity)
    }
}

// ==================================================================================
// LOGGING / METRICS CONFIG
// ==================================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// pretty, json or compact
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

// ==================================================================================
// ROOT
// ==================================================================================

/// Root of the LiveScore configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScorerConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}
