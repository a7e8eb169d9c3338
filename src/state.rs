use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::Status;

/// Shared table of last-known site statuses.
///
/// Cloning the table clones a handle to the same underlying map, so the
/// poller and every request handler operate on one set of entries. Writes
/// take the lock exclusively; concurrent checks of the same site resolve
/// last-writer-wins.
#[derive(Clone, Default)]
pub struct StatusTable {
    inner: Arc<RwLock<HashMap<String, Status>>>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts a site's status, returning the previous one if the site was
    /// already tracked.
    pub async fn set(&self, url: impl Into<String>, status: Status) -> Option<Status> {
        self.inner.write().await.insert(url.into(), status)
    }

    pub async fn get(&self, url: &str) -> Option<Status> {
        self.inner.read().await.get(url).copied()
    }

    /// Snapshot of the whole table.
    pub async fn all(&self) -> HashMap<String, Status> {
        self.inner.read().await.clone()
    }

    /// Snapshot of the tracked URLs.
    pub async fn keys(&self) -> Vec<String> {
        self.inner.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
