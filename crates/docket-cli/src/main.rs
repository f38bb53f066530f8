//! Docket CLI - Command-line interface for the contract analysis pipeline.

use clap::Parser;
use docket_cli::cli::{ConfigAction, ConfigArgs};
use docket_cli::commands;
use docket_cli::{Cli, CliFormat, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing (log to stderr; RUST_LOG wins over --verbose)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let color_enabled = !cli.no_color;
    if let Err(e) = run(cli).await {
        eprintln!("{}", Formatter::new(CliFormat::Text, color_enabled).error(&e.to_string()));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> docket_cli::Result<()> {
    // init must work before any file exists
    let config = match &cli.command {
        Command::Config(ConfigArgs {
            action: ConfigAction::Init { .. },
        }) => Config::default(),
        _ => Config::load(cli.config.as_deref())?,
    };

    match cli.command {
        Command::Analyze(args) => {
            let formatter = Formatter::new(args.format, !cli.no_color);
            commands::execute_analyze(args, &config, &formatter).await?;
        }
        Command::Config(args) => {
            let formatter = Formatter::new(CliFormat::Text, !cli.no_color);
            commands::execute_config(args, &config, cli.config.as_deref(), &formatter)?;
        }
    }

    Ok(())
}
