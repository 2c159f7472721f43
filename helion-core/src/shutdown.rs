use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative shutdown signal shared between a coordinator loop (Finder or
/// Ingester) and whatever installs the process's interrupt handler.
///
/// Neither loop is interrupted mid-path or mid-batch: the flag is only
/// consulted at the sleep boundary between iterations (§5, "Cancellation /
/// shutdown").
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
