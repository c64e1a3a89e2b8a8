use crate::*;
use thiserror::Error;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "json", "compact"];
const ENVIRONMENTS: &[&str] = &["development", "staging", "production"];

/// Upper bound on retained undo frames per match
const MAX_HISTORY_CAPACITY: usize = 10_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Service name is required")]
    MissingServiceName,

    #[error("Invalid port for {field}: {port}. Must be between 1 and 65535")]
    InvalidPort { field: String, port: u16 },

    #[error("Port {port} is used by both {first} and {second}")]
    PortCollision {
        port: u16,
        first: String,
        second: String,
    },

    #[error("Server host is required")]
    MissingHost,

    #[error("{field} must be between 1 and {max}, got: {value}")]
    InvalidCapacity {
        field: String,
        value: usize,
        max: usize,
    },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Environment variable placeholder in '{field}' was not resolved")]
    UnresolvedEnvVar { field: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &ScorerConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_service(&config.service, &mut report);
    validate_server(&config.server, &mut report);
    validate_scoring(&config.scoring, &mut report);
    validate_logging(&config.logging, &mut report);
    validate_metrics(config, &mut report);

    report
}

fn validate_service(service: &ServiceConfig, report: &mut ValidationReport) {
    if service.name.trim().is_empty() {
        report.add_error(ValidationError::MissingServiceName);
    } else if has_unresolved_env_vars(&service.name) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: "service.name".to_string(),
        });
    }

    if !ENVIRONMENTS.contains(&service.environment.as_str()) {
        report.add_warning(
            "service.environment",
            &format!("unknown environment '{}'", service.environment),
        );
    }
}

fn validate_server(server: &ServerSection, report: &mut ValidationReport) {
    if server.host.trim().is_empty() {
        report.add_error(ValidationError::MissingHost);
    } else if has_unresolved_env_vars(&server.host) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: "server.host".to_string(),
        });
    }

    if server.http_port == 0 {
        report.add_error(ValidationError::InvalidPort {
            field: "server.http_port".to_string(),
            port: server.http_port,
        });
    } else if server.http_port < 1024 {
        report.add_warning(
            "server.http_port",
            "privileged port; binding may require elevated permissions",
        );
    }

    match server.shutdown_timeout_secs {
        None => report.add_default(
            "server.shutdown_timeout_secs",
            &default_shutdown_timeout_secs().to_string(),
        ),
        Some(0) => report.add_warning(
            "server.shutdown_timeout_secs",
            "0 drops in-flight requests immediately on shutdown",
        ),
        Some(_) => {}
    }
}

fn validate_scoring(scoring: &ScoringConfig, report: &mut ValidationReport) {
    let bounds = [
        (
            "scoring.history_capacity",
            scoring.history_capacity,
            default_history_capacity(),
            MAX_HISTORY_CAPACITY,
        ),
        (
            "scoring.over_buffer_capacity",
            scoring.over_buffer_capacity,
            default_over_buffer_capacity(),
            1_000,
        ),
        (
            "scoring.broadcast_capacity",
            scoring.broadcast_capacity,
            default_broadcast_capacity(),
            65_536,
        ),
    ];

    for (field, value, default, max) in bounds {
        match value {
            None => report.add_default(field, &default.to_string()),
            Some(v) if v == 0 || v > max => {
                report.add_error(ValidationError::InvalidCapacity {
                    field: field.to_string(),
                    value: v,
                    max,
                });
            }
            Some(_) => {}
        }
    }

    // A full over with a few extras should fit without eviction
    if let Some(capacity) = scoring.over_buffer_capacity {
        if capacity > 0 && capacity < 6 {
            report.add_warning(
                "scoring.over_buffer_capacity",
                "smaller than one over; ball labels will be evicted mid-over",
            );
        }
    }
}

fn validate_logging(logging: &LoggingConfig, report: &mut ValidationReport) {
    if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogLevel(logging.level.clone()));
    }
    if !LOG_FORMATS.contains(&logging.format.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(logging.format.clone()));
    }
}

fn validate_metrics(config: &ScorerConfig, report: &mut ValidationReport) {
    if !config.metrics.enabled {
        return;
    }

    if config.metrics.port == 0 {
        report.add_error(ValidationError::InvalidPort {
            field: "metrics.port".to_string(),
            port: config.metrics.port,
        });
    } else if config.metrics.port == config.server.http_port {
        report.add_error(ValidationError::PortCollision {
            port: config.metrics.port,
            first: "server.http_port".to_string(),
            second: "metrics.port".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_generated_config_is_valid_without_defaults() {
        let report = validate_config(&generate_default_config());
        assert!(report.is_valid());
        assert!(report.defaults_applied.is_empty());
    }

    #[test]
    fn test_unset_capacities_are_reported_as_defaults() {
        let report = validate_config(&ScorerConfig::default());
        assert!(report.is_valid());

        let fields: Vec<_> = report
            .defaults_applied
            .iter()
            .map(|d| d.field.as_str())
            .collect();
        assert!(fields.contains(&"scoring.history_capacity"));
        assert!(fields.contains(&"scoring.over_buffer_capacity"));
        assert!(fields.contains(&"scoring.broadcast_capacity"));
        assert!(fields.contains(&"server.shutdown_timeout_secs"));
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let mut config = generate_default_config();
        config.scoring.history_capacity = Some(0);

        let report = validate_config(&config);
        assert!(!report.is_valid());
        assert_matches!(
            &report.errors[0],
            ValidationError::InvalidCapacity { field, value: 0, .. } if field == "scoring.history_capacity"
        );
    }

    #[test]
    fn test_small_over_buffer_warns() {
        let mut config = generate_default_config();
        config.scoring.over_buffer_capacity = Some(4);

        let report = validate_config(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].field, "scoring.over_buffer_capacity");
    }

    #[test]
    fn test_metrics_port_collision() {
        let mut config = generate_default_config();
        config.metrics.enabled = true;
        config.metrics.port = config.server.http_port;

        let report = validate_config(&config);
        assert_matches!(
            report.errors.as_slice(),
            [ValidationError::PortCollision { port: 8080, .. }]
        );

        config.metrics.enabled = false;
        assert!(validate_config(&config).is_valid());
    }

    #[test]
    fn test_logging_and_port_errors() {
        let mut config = generate_default_config();
        config.logging.level = "verbose".to_string();
        config.logging.format = "xml".to_string();
        config.server.http_port = 0;

        let report = validate_config(&config);
        assert_eq!(report.errors.len(), 3);
        assert!(report
            .errors
            .contains(&ValidationError::InvalidLogLevel("verbose".to_string())));
    }

    #[test]
    fn test_unresolved_host_placeholder() {
        let mut config = generate_default_config();
        config.server.host = "${LIVESCORE_HOST}".to_string();

        let report = validate_config(&config);
        assert_matches!(
            report.errors.as_slice(),
            [ValidationError::UnresolvedEnvVar { field }] if field == "server.host"
        );
    }
}
