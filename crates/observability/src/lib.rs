//! Observability infrastructure for LiveScore
//!
//! - Structured logging via tracing
//! - Prometheus metrics exporter
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("livescore", LogFormat::Pretty, "info")?;
//! observability::init_metrics(9090)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::init_metrics;
