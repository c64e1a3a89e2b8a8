use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "livescore")]
#[command(about = "LiveScore - ball-by-ball cricket scoring service")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the scoring service with the given configuration
    Start {
        /// Path to the configuration file
        #[arg(short, long, default_value = "master_config/livescore.yaml")]
        config: PathBuf,

        /// Override HTTP port
        #[arg(long)]
        http: Option<u16>,
    },

    /// Validate configuration without starting the service
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "master_config/livescore.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "livescore.yaml")]
        output: PathBuf,
    },

    /// Apply a JSON array of commands to a fresh match and print the final state
    Replay {
        /// File holding the commands
        #[arg(short, long)]
        file: PathBuf,

        /// Name of side A
        #[arg(long, default_value = "Team A")]
        team_a: String,

        /// Name of side B
        #[arg(long, default_value = "Team B")]
        team_b: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_start_defaults() {
        let cli = Cli::try_parse_from(["livescore", "start"]).unwrap();
        assert_matches!(
            cli.command,
            Commands::Start { config, http: None } if config == PathBuf::from("master_config/livescore.yaml")
        );
    }

    #[test]
    fn test_start_with_port_override() {
        let cli = Cli::try_parse_from(["livescore", "start", "--http", "9000"]).unwrap();
        assert_matches!(cli.command, Commands::Start { http: Some(9000), .. });
    }

    #[test]
    fn test_replay_requires_file() {
        assert!(Cli::try_parse_from(["livescore", "replay"]).is_err());

        let cli = Cli::try_parse_from([
            "livescore", "replay", "--file", "match.json", "--team-a", "Lions",
        ])
        .unwrap();
        assert_matches!(
            cli.command,
            Commands::Replay { team_a, team_b, .. } if team_a == "Lions" && team_b == "Team B"
        );
    }
}
