//! Scan command implementation
//!
//! Runs a fixed number of cycles and prints each cycle's stats and the
//! active alerts to stdout as JSON lines, in the dashboard wire format.

use crate::broadcast::{BroadcastChannel, ScannerEvent};
use crate::config::Config;
use crate::feed::build_sources;
use crate::scanner::ScanOrchestrator;
use clap::Args;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Number of scan cycles to run
    #[arg(short = 'n', long, default_value_t = 1)]
    pub cycles: u32,
}

impl ScanArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let sources = build_sources(&config.sources, config.scanner.fetch_timeout())?;
        if sources.is_empty() {
            anyhow::bail!("No price sources configured");
        }

        let mut scanner = ScanOrchestrator::new(sources, &config.scanner, BroadcastChannel::default());
        let handle = scanner.handle();

        for cycle_no in 0..self.cycles {
            if cycle_no > 0 {
                tokio::time::sleep(config.scanner.scan_interval()).await;
            }

            let cycle = scanner.scan_cycle().await;
            println!("{}", ScannerEvent::Stats(cycle).to_json()?);

            let alerts = handle.active_alerts().await;
            println!("{}", ScannerEvent::Snapshot(alerts).to_json()?);
        }

        Ok(())
    }
}
