//! CLI module - Command-line interface for qrmenu
//!
//! This module provides a structured CLI using clap for argument parsing.

use clap::{Parser, Subcommand};

/// qrmenu - Digital menus with QR codes and WhatsApp ordering
#[derive(Parser)]
#[command(name = "qrmenu")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API until Ctrl+C (default)
    #[command(alias = "daemon")]
    Serve,

    /// Validate the configuration and database, then exit
    Check,

    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["qrmenu"]).unwrap();
        assert_eq!(cli.command, None);

        let cli = Cli::try_parse_from(["qrmenu", "serve"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Serve));

        let cli = Cli::try_parse_from(["qrmenu", "check"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Check));

        assert!(Cli::try_parse_from(["qrmenu", "bogus"]).is_err());
    }
}
