use clap::Parser;
use momentum_scanner::cli::{Cli, Commands};
use momentum_scanner::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using bundled example configuration");
            toml::from_str(include_str!("../config.toml.example"))?
        }
    };
    config.validate()?;

    // Initialize telemetry
    momentum_scanner::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(symbols = config.symbol_count(), "Starting momentum scanner");
            args.execute(&config).await?;
        }
        Commands::Scan(args) => {
            tracing::info!(cycles = args.cycles, "Running one-off scan");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
