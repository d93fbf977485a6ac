//! Orchestrator-wide counters.
//!
//! Storage is lock-free (`AtomicU64` behind an `Arc`) so the executor and
//! session manager can bump counters without touching any other lock.
//! All counters are monotonic and never reset.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counter storage. Cloning shares the same counters.
#[derive(Clone, Debug, Default)]
pub struct OrchestratorMetricsStorage {
    inner: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    batches_run: AtomicU64,
    batches_cancelled: AtomicU64,
    items_succeeded: AtomicU64,
    items_failed: AtomicU64,
    sessions_opened: AtomicU64,
    sessions_busy: AtomicU64,
}

impl OrchestratorMetricsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_batch(&self) {
        self.inner.batches_run.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cancelled(&self) {
        self.inner.batches_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_item(&self, succeeded: bool) {
        let counter = if succeeded {
            &self.inner.items_succeeded
        } else {
            &self.inner.items_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_session_opened(&self) {
        self.inner.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_session_busy(&self) {
        self.inner.sessions_busy.fetch_add(1, Ordering::Relaxed);
    }
}

/// Read-only view over [`OrchestratorMetricsStorage`].
#[derive(Clone, Debug)]
pub struct OrchestratorMetrics {
    storage: OrchestratorMetricsStorage,
}

impl OrchestratorMetrics {
    pub fn new(storage: OrchestratorMetricsStorage) -> Self {
        Self { storage }
    }

    /// Batches that passed confirmation and reached dispatch. Declined
    /// batches are counted by `batches_cancelled_total` instead.
    pub fn batches_run_total(&self) -> u64 {
        self.storage.inner.batches_run.load(Ordering::Relaxed)
    }

    pub fn batches_cancelled_total(&self) -> u64 {
        self.storage.inner.batches_cancelled.load(Ordering::Relaxed)
    }

    pub fn items_succeeded_total(&self) -> u64 {
        self.storage.inner.items_succeeded.load(Ordering::Relaxed)
    }

    pub fn items_failed_total(&self) -> u64 {
        self.storage.inner.items_failed.load(Ordering::Relaxed)
    }

    pub fn sessions_opened_total(&self) -> u64 {
        self.storage.inner.sessions_opened.load(Ordering::Relaxed)
    }

    /// Acquisitions refused because an exclusive session was held.
    pub fn sessions_busy_total(&self) -> u64 {
        self.storage.inner.sessions_busy.load(Ordering::Relaxed)
    }
}
