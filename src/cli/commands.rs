//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Export datastore kinds into warehouse tables
#[derive(Parser, Debug)]
#[command(name = "kindsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Destination project (overrides the config file)
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Destination dataset (overrides the config file)
    #[arg(long, global = true)]
    pub dataset: Option<String>,

    /// Regular expression of property names to leave out
    #[arg(long, global = true)]
    pub exclude: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level selected by the flags
    pub fn log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the schema inferred for a kind
    Schema {
        /// Kind name
        kind: String,
    },

    /// Create the table of a kind from its inferred schema
    CreateTable {
        /// Kind name
        kind: String,
    },

    /// Stream exported records into the warehouse
    Ingest {
        /// Records file (JSON array, single object, or JSON lines)
        path: PathBuf,
    },

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingest_with_overrides() {
        let cli = Cli::parse_from([
            "kindsync",
            "-C",
            "sync.yaml",
            "--project",
            "p",
            "ingest",
            "records.jsonl",
            "--exclude",
            "^_",
            "-v",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("sync.yaml")));
        assert_eq!(cli.project.as_deref(), Some("p"));
        assert_eq!(cli.exclude.as_deref(), Some("^_"));
        assert_eq!(cli.log_level(), LogLevel::Debug);
        assert!(matches!(cli.command, Commands::Ingest { ref path } if path == &PathBuf::from("records.jsonl")));
    }

    #[test]
    fn test_parse_create_table() {
        let cli = Cli::parse_from(["kindsync", "create-table", "Person"]);
        assert!(matches!(cli.command, Commands::CreateTable { ref kind } if kind == "Person"));
        assert_eq!(cli.log_level(), LogLevel::Info);
    }

    #[test]
    fn test_parse_serve_default_port() {
        let cli = Cli::parse_from(["kindsync", "serve"]);
        assert!(matches!(cli.command, Commands::Serve { port: 8080 }));
    }
}
