//! sandman: terminates the one instance per run whose load is far above
//! the rest of its auto-scaling group.
//!
//! # Usage
//!
//! ```text
//! sandman run --config /etc/tapir/sandman.toml --dry-run
//! sandman config --config /etc/tapir/sandman.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "sandman",
    about = "Tapir sandman: peer-relative outlier termination for auto-scaling groups",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk every auto-scaling group once and terminate at most one outlier.
    Run {
        /// Path to sandman.toml (default: built-in reference policy)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Log the decision without terminating anything.
        #[arg(long)]
        dry_run: bool,
        /// AWS region override (default: from the environment).
        #[arg(long)]
        region: Option<String>,
        /// Scheduler event payload (JSON file). Logged, not interpreted.
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// Print the effective configuration.
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,tapir=debug,sandman=debug"))?;

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    match cli.command {
        Commands::Run {
            config,
            dry_run,
            region,
            event,
        } => commands::run::run(config.as_deref(), dry_run, region, event.as_deref()).await,
        Commands::Config { config } => commands::config::print(config.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_flags() {
        let cli = Cli::try_parse_from([
            "sandman",
            "run",
            "--dry-run",
            "--region",
            "ap-southeast-2",
            "-c",
            "sandman.toml",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                config,
                dry_run,
                region,
                event,
            } => {
                assert!(dry_run);
                assert_eq!(region.as_deref(), Some("ap-southeast-2"));
                assert_eq!(config, Some(PathBuf::from("sandman.toml")));
                assert!(event.is_none());
            }
            Commands::Config { .. } => panic!("expected run"),
        }
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn run_is_live_by_default() {
        let cli = Cli::try_parse_from(["sandman", "--log-format", "json", "run"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Run { dry_run: false, .. }));
    }

    #[test]
    fn subcommand_required() {
        assert!(Cli::try_parse_from(["sandman"]).is_err());
    }
}
