use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Progress reporting and cancellation for transfers
pub trait ProgressMonitor: fmt::Debug + Send + Sync {
    fn is_canceled(&self) -> bool;

    fn worked(&self, _bytes: u64) {}
}

/// Monitor that is never canceled
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMonitor;

impl ProgressMonitor for NullMonitor {
    fn is_canceled(&self) -> bool {
        false
    }
}

/// Monitor that can be canceled from another thread
#[derive(Debug, Default)]
pub struct CancellableMonitor {
    canceled: AtomicBool,
    worked: AtomicU64,
}

impl CancellableMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    /// Bytes reported so far
    pub fn total_worked(&self) -> u64 {
        self.worked.load(Ordering::Relaxed)
    }
}

impl ProgressMonitor for CancellableMonitor {
    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    fn worked(&self, bytes: u64) {
        self.worked.fetch_add(bytes, Ordering::Relaxed);
    }
}
