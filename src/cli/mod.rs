//! CLI interface for momentum-scanner
//!
//! Provides subcommands for:
//! - `run`: Scan continuously and serve the dashboard WebSocket
//! - `scan`: Run a fixed number of cycles and print results
//! - `config`: Show the effective configuration

mod run;
mod scan;

pub use run::RunArgs;
pub use scan::ScanArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "momentum-scanner")]
#[command(about = "Scans market data for short-window price breakouts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan continuously and serve the dashboard
    Run(RunArgs),
    /// Run a fixed number of scan cycles without a server
    Scan(ScanArgs),
    /// Show the effective configuration
    Config,
}
