use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bot-updater",
    about = "Bot self-updater - fetch released runtime files and apply them after confirmation",
    version,
    author
)]
pub struct Cli {
    /// Path to the updater configuration file
    #[arg(short, long, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the pending update plan without changing anything
    Check,

    /// Offer the pending update and apply it once confirmed with "yes"
    Update {
        /// Also push the updated files to the source repository
        #[arg(long)]
        full: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_update_with_custom_config() {
        let cli = Cli::parse_from(["bot-updater", "--config", "bot.toml", "update", "--full", "-v"]);
        assert_eq!(cli.config, PathBuf::from("bot.toml"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Update { full: true }));
    }

    #[test]
    fn defaults_to_local_config_file() {
        let cli = Cli::parse_from(["bot-updater", "check"]);
        assert_eq!(cli.config, PathBuf::from("updater.toml"));
        assert!(matches!(cli.command, Commands::Check));
    }
}
