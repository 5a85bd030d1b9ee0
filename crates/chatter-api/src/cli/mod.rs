//! CLI command definitions for the `chatter` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod status;
pub mod user;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use chatter_observe::tracing_setup::LogFormat;
use chatter_types::config::StorageBackend;

/// Run and administer the Chatter chat service.
#[derive(Parser)]
#[command(name = "chatter", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format: text or json.
    #[arg(long, global = true, default_value = "text", env = "CHATTER_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides config.toml).
        #[arg(short, long, env = "CHATTER_PORT")]
        port: Option<u16>,

        /// Host to bind to (overrides config.toml).
        #[arg(long, env = "CHATTER_HOST")]
        host: Option<String>,
    },

    /// Manage user accounts.
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Show storage location and record counts.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Register a new user.
    Add {
        /// Username (3-32 characters: letters, digits, `_`, `-`).
        username: String,

        /// Password (prompted for when omitted).
        #[arg(long)]
        password: Option<String>,
    },
}

/// Reject commands whose effect would vanish with the process.
///
/// With in-memory storage every run starts empty: `user add` is refused and
/// `status` warns that its counts describe a throwaway store.
pub fn check_storage(command: &Commands, storage: StorageBackend) -> anyhow::Result<()> {
    if storage != StorageBackend::Memory {
        return Ok(());
    }
    match command {
        Commands::User { .. } => anyhow::bail!(
            "storage is 'memory': a user added here would be lost when the command exits \
             (set storage = \"sqlite\" in config.toml or CHATTER_STORAGE=sqlite)"
        ),
        Commands::Status => {
            tracing::warn!("Storage is 'memory'; status reflects an empty, per-process store");
            Ok(())
        }
        Commands::Serve { .. } | Commands::Completions { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_with_overrides() {
        let cli = Cli::try_parse_from([
            "chatter",
            "--log-format",
            "json",
            "-vv",
            "serve",
            "--port",
            "8080",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Serve { port, .. } => assert_eq!(port, Some(8080)),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_user_add() {
        let cli =
            Cli::try_parse_from(["chatter", "user", "add", "ada", "--password", "secret123"])
                .unwrap();
        match cli.command {
            Commands::User {
                action: UserCommand::Add { username, password },
            } => {
                assert_eq!(username, "ada");
                assert_eq!(password.as_deref(), Some("secret123"));
            }
            _ => panic!("expected user add"),
        }
    }

    #[test]
    fn test_memory_storage_refuses_user_add() {
        let add = Cli::try_parse_from(["chatter", "user", "add", "ada"]).unwrap().command;
        let err = check_storage(&add, StorageBackend::Memory).unwrap_err();
        assert!(err.to_string().contains("memory"));
        assert!(check_storage(&add, StorageBackend::Sqlite).is_ok());

        let serve = Cli::try_parse_from(["chatter", "serve"]).unwrap().command;
        assert!(check_storage(&serve, StorageBackend::Memory).is_ok());
        assert!(check_storage(&Commands::Status, StorageBackend::Memory).is_ok());
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["chatter", "--log-format", "xml", "status"]).is_err());
    }
}
