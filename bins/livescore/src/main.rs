//! LiveScore CLI and Server Binary
//!
//! Commands for initializing and validating configuration, starting the
//! scoring server, and replaying a recorded command log offline.

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use config::{generate_default_config, load_config, save_config, validate_config, ScorerConfig};
use observability::{init_logging, init_metrics, LogFormat};
use scoring_engine::api::create_service_router;
use scoring_engine::{Command, MatchState, ScoreRequest, ScoringEngine, ScoringService};
use serde_json::Value;
use server::{HttpServer, ServerConfig, ServerExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start { config, http } => start_command(config, http).await,
        Commands::Validate { config } => {
            init_logging("livescore", LogFormat::Pretty, "info")?;
            validate_command(config)
        }
        Commands::Init { output } => {
            init_logging("livescore", LogFormat::Pretty, "info")?;
            init_command(output)
        }
        Commands::Replay {
            file,
            team_a,
            team_b,
        } => {
            // stdout carries the final state; keep logs quiet unless RUST_LOG asks
            init_logging("livescore", LogFormat::Compact, "warn")?;
            replay_command(file, team_a, team_b)
        }
    }
}

fn log_format(config: &ScorerConfig) -> LogFormat {
    LogFormat::parse(&config.logging.format).unwrap_or_default()
}

async fn start_command<P: AsRef<Path>>(config_path: P, http_override: Option<u16>) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    init_logging(&config.service.name, log_format(&config), &config.logging.level)?;

    let report = validate_config(&config);
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }
    for default in &report.defaults_applied {
        debug!(field = %default.field, value = %default.value, "Default applied");
    }
    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start scoring service due to configuration errors");
    }

    if config.metrics.enabled {
        init_metrics(config.metrics.port)?;
    }

    let engine = ScoringEngine::with_limits(
        config.scoring.history_capacity(),
        config.scoring.over_buffer_capacity(),
    );
    let service = Arc::new(ScoringService::in_memory(
        engine,
        config.scoring.broadcast_capacity(),
    ));

    let http_port = http_override.unwrap_or(config.server.http_port);
    if http_override.is_some() {
        debug!(port = http_port, "HTTP port overridden from command line");
    }
    let server_config = ServerConfig::new(config.server.host.clone(), http_port)
        .with_shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs()));

    info!(
        service = %config.service.name,
        environment = %config.service.environment,
        http_port,
        "Starting scoring service"
    );

    let server = HttpServer::new(server_config, create_service_router(service));
    server.run_with_ctrl_c().await?;

    info!("Scoring service stopped");
    Ok(())
}

fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = load_config(&config_path)?;
    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Service: {} ({})", config.service.name, config.service.environment);
    println!("HTTP: {}:{}", config.server.host, config.server.http_port);
    println!(
        "Undo history: {} frames per match",
        config.scoring.history_capacity()
    );
    if config.metrics.enabled {
        println!("Metrics: port {}", config.metrics.port);
    }

    Ok(())
}

fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration file to customize settings");
    println!(
        "  2. Run 'livescore validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'livescore start --config {:?}' to start the scoring service",
        output_path
    );

    Ok(())
}

fn replay_command<P: AsRef<Path>>(file: P, team_a: String, team_b: String) -> Result<()> {
    let file = file.as_ref();
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read command log: {:?}", file))?;
    let entries: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("Command log must be a JSON array: {:?}", file))?;

    let state = replay(&ScoringEngine::new(), team_a, team_b, entries)?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

/// Decode one log entry: a tagged command, or a flat score request
fn decode_entry(entry: Value) -> Result<Command> {
    if entry.get("type").is_some() {
        return Ok(serde_json::from_value(entry)?);
    }
    let request: ScoreRequest = serde_json::from_value(entry)?;
    Ok(Command::try_from(request)?)
}

fn replay(
    engine: &ScoringEngine,
    team_a: String,
    team_b: String,
    entries: Vec<Value>,
) -> Result<MatchState> {
    let mut state = engine.schedule(team_a, team_b);
    for (index, entry) in entries.into_iter().enumerate() {
        let command = decode_entry(entry).with_context(|| format!("Entry {} is not a command", index))?;
        state = engine
            .apply(&state, command)
            .with_context(|| format!("Entry {} was rejected", index))?;
    }
    info!(version = state.version, status = %state.status, "Replay complete");
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoring_engine::MatchStatus;
    use serde_json::json;

    fn opening() -> Vec<Value> {
        vec![
            json!({"toss": {"winner": "A", "decision": "BAT"}}),
            json!({"type": "select_batsman", "player": {"id": "7f1d8a0e-3c2b-4b7e-9a51-0c9f4d2e6a11", "name": "One"}, "slot": "striker"}),
            json!({"type": "select_batsman", "player": {"id": "1b6c2f4a-8e9d-4c3b-a2f1-5d7e9b0c3a22", "name": "Two"}, "slot": "nonStriker"}),
            json!({"selectBowler": {"id": "4e2a9c7b-1d3f-4a6e-b8c5-2f0d9e7a1b33", "name": "Quick"}}),
        ]
    }

    #[test]
    fn test_replay_mixes_flat_and_tagged_entries() {
        let mut entries = opening();
        entries.push(json!({"team": "A", "runs": 4}));
        entries.push(json!({"type": "ball", "team": "A", "event": {"kind": "extra", "extra": "WIDE"}}));

        let state = replay(&ScoringEngine::new(), "Lions".into(), "Tigers".into(), entries).unwrap();
        assert_eq!(state.status, MatchStatus::Live);
        assert_eq!(state.team_a.name, "Lions");
        assert_eq!(state.version, 6);
    }

    #[test]
    fn test_replay_reports_rejected_entry() {
        let mut entries = opening();
        entries.push(json!({"team": "A", "runs": 9}));

        let err = replay(&ScoringEngine::new(), "A".into(), "B".into(), entries).unwrap_err();
        assert!(err.to_string().contains("Entry 4 was rejected"));
    }

    #[test]
    fn test_entry_without_operation_is_not_a_command() {
        let err = decode_entry(json!({"team": "A"})).unwrap_err();
        assert!(err.to_string().contains("no operation"));
    }
}
