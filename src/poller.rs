use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};
use tracing::{error, info, warn};

use crate::checker::HttpChecker;
use crate::models::Status;
use crate::state::StatusTable;

/// Background loop that re-checks every tracked site on a fixed period.
pub struct Poller {
    table: StatusTable,
    checker: HttpChecker,
    interval: Duration,
    limiter: Arc<Semaphore>,
}

impl Poller {
    pub fn new(
        table: StatusTable,
        checker: HttpChecker,
        interval: Duration,
        max_concurrency: usize,
    ) -> Self {
        Self {
            table,
            checker,
            interval,
            limiter: Arc::new(Semaphore::new(max_concurrency)),
        }
    }

    /// Sweeps until `shutdown` flips to true.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "poller started");

        let mut timer = tokio::time::interval(self.interval);
        // The first tick completes immediately; sites were already checked
        // when they entered the table, so wait a full period instead.
        timer.tick().await;

        loop {
            tokio::select! {
                _ = timer.tick() => self.poll_once().await,
                _ = shutdown.changed() => {
                    info!("poller stopping");
                    return;
                }
            }
        }
    }

    /// One sweep: snapshot the tracked sites, probe them concurrently and
    /// write each result back.
    pub async fn poll_once(&self) {
        let sites = self.table.keys().await;
        if sites.is_empty() {
            return;
        }

        let started = Instant::now();
        let mut tasks = FuturesUnordered::new();

        for site in sites {
            let checker = self.checker.clone();
            let limiter = Arc::clone(&self.limiter);
            tasks.push(tokio::spawn(async move {
                let _permit = limiter.acquire_owned().await.ok();
                let status = checker.check(&site).await;
                (site, status)
            }));
        }

        let total = tasks.len();
        while let Some(joined) = tasks.next().await {
            if let Ok((site, status)) = joined {
                self.record(&site, status).await;
            }
        }

        info!(
            sites = total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "polling sweep finished"
        );
    }

    async fn record(&self, site: &str, status: Status) {
        let previous = self.table.set(site, status).await;
        match (previous, status) {
            (Some(prev), now) if prev != now => {
                if now == Status::Down {
                    error!(site, "site went DOWN");
                } else {
                    warn!(site, "site recovered");
                }
            }
            _ => {}
        }
    }
}
