//! Cleanup of expired submissions.
//!
//! `expires_at` on the record is the source of truth: a record past it
//! no longer blocks a retake whether or not it was deleted. The tasks here
//! only reclaim space. `ExpiryScheduler` fires one keyed delete per
//! submission, and `ExpiryReaper` sweeps periodically so records whose
//! timer died with a restart still go away.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::{quiz::identity::Identity, storage::Store, utils::clock::Clock};

#[derive(Clone)]
pub struct ExpiryScheduler {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl ExpiryScheduler {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Spawns a fire-and-forget delete of `identity`'s record at `expires_at`.
    pub fn schedule(&self, identity: Identity, expires_at: DateTime<Utc>) -> JoinHandle<()> {
        let delay = (expires_at - self.clock.now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        let store = self.store.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match store.delete_if_expired(&identity).await {
                Ok(true) => tracing::info!(%identity, "expired submission deleted"),
                Ok(false) => tracing::debug!(%identity, "submission already gone or renewed"),
                Err(e) => tracing::warn!(%identity, "Failed to delete expired submission: {}", e),
            }
        })
    }
}

pub struct ExpiryReaper {
    store: Arc<dyn Store>,
    interval: Duration,
}

impl ExpiryReaper {
    pub fn new(store: Arc<dyn Store>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// One sweep. Failures are logged and reported as zero deletions.
    pub async fn sweep(&self) -> u64 {
        match self.store.purge_expired().await {
            Ok(0) => 0,
            Ok(purged) => {
                tracing::info!(purged, "expired submissions purged");
                purged
            }
            Err(e) => {
                tracing::warn!("Expired submission sweep failed: {}", e);
                0
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }
}
