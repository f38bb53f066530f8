//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use docket_extractor::PipelineConfig;
use std::path::PathBuf;

/// Docket - Plain-English analysis of long contracts.
#[derive(Debug, Parser)]
#[command(name = "docket")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.docket/config.toml)
    #[arg(short, long, global = true, env = "DOCKET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Bulleted report (default)
    Text,
    /// Full pipeline output as JSON
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze an extracted-text document
    Analyze(AnalyzeArgs),

    /// Show or create the configuration file
    Config(ConfigArgs),
}

/// Arguments for the analyze command.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Plain-text file to analyze ("-" reads stdin)
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: CliFormat,

    /// Write deadline events to this .ics file
    #[arg(long)]
    pub ics: Option<PathBuf>,

    /// User id to record usage against
    #[arg(short, long, env = "DOCKET_USER")]
    pub user: Option<String>,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

/// Pipeline overrides; each takes precedence over the configuration file.
#[derive(Debug, Default, Args)]
pub struct TuningArgs {
    /// Chunk size in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared between neighbouring chunks
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Records merged per call
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Maximum calls in flight
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Analyze at most this many chunks
    #[arg(long)]
    pub max_chunks: Option<usize>,
}

impl TuningArgs {
    /// Apply the overrides to `config`.
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(size) = self.chunk_size {
            config.chunk_size = size;
        }
        if let Some(overlap) = self.overlap {
            config.chunk_overlap = overlap;
        }
        if let Some(batch) = self.batch_size {
            config.reduce_batch_size = batch;
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = concurrency;
        }
        if self.max_chunks.is_some() {
            config.max_chunks = self.max_chunks;
        }
    }
}

/// Arguments for configuration management.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_command() {
        let cli = Cli::parse_from(["docket", "analyze", "lease.txt"]);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.file, PathBuf::from("lease.txt"));
                assert_eq!(args.format, CliFormat::Text);
                assert!(args.ics.is_none());
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_with_flags() {
        let cli = Cli::parse_from([
            "docket",
            "--no-color",
            "analyze",
            "lease.txt",
            "--format",
            "json",
            "--ics",
            "deadlines.ics",
            "--batch-size",
            "4",
            "--max-chunks",
            "10",
        ]);
        assert!(cli.no_color);
        let Command::Analyze(args) = cli.command else {
            panic!("Expected Analyze command");
        };
        assert_eq!(args.format, CliFormat::Json);
        assert_eq!(args.ics, Some(PathBuf::from("deadlines.ics")));
        assert_eq!(args.tuning.batch_size, Some(4));
        assert_eq!(args.tuning.max_chunks, Some(10));
    }

    #[test]
    fn test_config_commands() {
        let cli = Cli::parse_from(["docket", "config", "init", "--force"]);
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force },
            }) => assert!(force),
            _ => panic!("Expected config init"),
        }
    }

    #[test]
    fn test_tuning_overrides() {
        let mut config = PipelineConfig::default();
        let tuning = TuningArgs {
            chunk_size: Some(5_000),
            overlap: Some(100),
            concurrency: Some(1),
            ..Default::default()
        };
        tuning.apply(&mut config);
        assert_eq!(config.chunk_size, 5_000);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.reduce_batch_size, 8);
        assert_eq!(config.max_chunks, None);
    }
}
