// Ballpark - CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: serve, sync-players, api-keys {create, rotate, set-status, show, delete}.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{execute, manage_api_keys, sync_players};

/// Ballpark - fantasy baseball data API and service key administration.
#[derive(Parser, Debug)]
#[command(name = "ballpark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve,

    /// Run one player sync now and exit.
    SyncPlayers {
        /// JSON player feed. Defaults to PLAYER_FEED_PATH.
        #[arg(long)]
        feed: Option<PathBuf>,
    },

    /// Manage service API keys.
    #[command(subcommand)]
    ApiKeys(ApiKeyCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyCommand {
    /// Issue a key for a new service. Prints the raw key once.
    Create {
        /// Service name (2-64 chars, lowercase letters, digits, hyphens).
        service_name: String,
    },

    /// Replace a service's key. The previous key stops working immediately.
    Rotate { service_name: String },

    /// Activate or deactivate a service's key.
    SetStatus {
        service_name: String,

        /// "active" or "inactive".
        status: String,
    },

    /// Show a service's key metadata (never the key itself).
    Show { service_name: String },

    /// Delete a service's key.
    Delete { service_name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_api_key_subcommands() {
        let cli = Cli::try_parse_from(["ballpark", "api-keys", "set-status", "draft-kit", "inactive"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::ApiKeys(ApiKeyCommand::SetStatus { ref service_name, ref status })
                if service_name == "draft-kit" && status == "inactive"
        ));

        let cli = Cli::try_parse_from(["ballpark", "serve"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve));

        let cli = Cli::try_parse_from(["ballpark", "sync-players", "--feed", "players.json"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::SyncPlayers { feed: Some(ref path) } if path == &PathBuf::from("players.json")
        ));
    }

    #[test]
    fn test_missing_arguments_are_usage_errors() {
        let err = Cli::try_parse_from(["ballpark", "api-keys", "set-status", "draft-kit"]).unwrap_err();
        assert!(err.use_stderr());

        let err = Cli::try_parse_from(["ballpark", "api-keys", "launch", "draft-kit"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_help_is_not_an_error_exit() {
        let err = Cli::try_parse_from(["ballpark", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
