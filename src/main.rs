use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use upwatch::api::{self, AppState};
use upwatch::checker::HttpChecker;
use upwatch::config::MonitorConfig;
use upwatch::poller::Poller;
use upwatch::state::StatusTable;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = MonitorConfig::load(Path::new("config.json"))?;

    let table = StatusTable::new();
    let checker = HttpChecker::new(config.check_timeout_secs)?;

    // Seed the table so the first sweep has something to re-check.
    for site in &config.websites {
        let status = checker.check(site).await;
        table.set(site.clone(), status).await;
    }
    if !config.websites.is_empty() {
        info!(count = config.websites.len(), "initial sites checked");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller = Poller::new(
        table.clone(),
        checker.clone(),
        Duration::from_secs(config.poll_interval_secs),
        config.max_concurrency,
    );
    let poller_shutdown = shutdown_rx.clone();
    tokio::spawn(async move {
        poller.run(poller_shutdown).await;
    });

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    let state = AppState {
        table,
        checker,
        shutdown: shutdown_rx,
    };
    api::serve(config.listen_addr, state).await
}
