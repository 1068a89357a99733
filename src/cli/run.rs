//! Run command implementation

use crate::broadcast::{BroadcastChannel, DashboardServer};
use crate::config::Config;
use crate::feed::build_sources;
use crate::scanner::ScanOrchestrator;
use clap::Args;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the dashboard bind address
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let sources = build_sources(&config.sources, config.scanner.fetch_timeout())?;
        if sources.is_empty() {
            anyhow::bail!("No price sources configured");
        }

        let channel = BroadcastChannel::new(config.server.subscriber_buffer);
        let scanner = ScanOrchestrator::new(sources, &config.scanner, channel);
        let handle = scanner.handle();

        let bind_addr = self.bind.as_deref().unwrap_or(&config.server.bind_addr);
        let server = DashboardServer::bind(bind_addr, handle).await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server_task = tokio::spawn(server.run(shutdown_rx.clone()));
        let scanner_task = tokio::spawn(scanner.run(shutdown_rx));

        tokio::signal::ctrl_c().await?;
        tracing::info!("Received Ctrl-C, shutting down");
        let _ = shutdown_tx.send(true);

        let stats = scanner_task.await?;
        server_task.await?;

        tracing::info!(
            cycles = stats.cycles,
            samples = stats.samples_processed,
            failures = stats.fetch_failures,
            alerts_created = stats.alerts_created,
            "Scanner stopped"
        );

        Ok(())
    }
}
