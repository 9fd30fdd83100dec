use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Lending counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub books_created: Arc<AtomicU64>,
    pub borrows_created: Arc<AtomicU64>,
    pub returns_processed: Arc<AtomicU64>,
    pub overdue_returns: Arc<AtomicU64>,
    pub fines_assessed: Arc<AtomicU64>,
    pub logins: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            books_created: Arc::new(AtomicU64::new(0)),
            borrows_created: Arc::new(AtomicU64::new(0)),
            returns_processed: Arc::new(AtomicU64::new(0)),
            overdue_returns: Arc::new(AtomicU64::new(0)),
            fines_assessed: Arc::new(AtomicU64::new(0)),
            logins: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_books_created(&self) {
        self.books_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_borrows_created(&self) {
        self.borrows_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a return; a non-zero fine also counts as an overdue return.
    pub fn record_return(&self, fine: i64) {
        self.returns_processed.fetch_add(1, Ordering::Relaxed);
        if fine > 0 {
            self.overdue_returns.fetch_add(1, Ordering::Relaxed);
            self.fines_assessed.fetch_add(fine as u64, Ordering::Relaxed);
        }
    }

    pub fn inc_logins(&self) {
        self.logins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            books_created: self.books_created.load(Ordering::Relaxed),
            borrows_created: self.borrows_created.load(Ordering::Relaxed),
            returns_processed: self.returns_processed.load(Ordering::Relaxed),
            overdue_returns: self.overdue_returns.load(Ordering::Relaxed),
            fines_assessed: self.fines_assessed.load(Ordering::Relaxed),
            logins: self.logins.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub books_created: u64,
    pub borrows_created: u64,
    pub returns_processed: u64,
    pub overdue_returns: u64,
    pub fines_assessed: u64,
    pub logins: u64,
    pub uptime_seconds: u64,
}
