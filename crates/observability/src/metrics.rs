//! Prometheus metrics exporter

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Metrics served at `/metrics` on the given port
pub fn metrics_addr(port: u16) -> anyhow::Result<SocketAddr> {
    Ok(format!("0.0.0.0:{}", port).parse()?)
}

/// Initialize the Prometheus metrics exporter
///
/// Starts an HTTP listener exposing every `metrics` facade counter, gauge and
/// histogram recorded by the process. Must be called from inside a tokio
/// runtime and at most once.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = metrics_addr(port)?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_addr() {
        let addr = metrics_addr(9090).unwrap();
        assert_eq!(addr.port(), 9090);
        assert!(addr.ip().is_unspecified());
    }
}
