//! Cooperative cancellation for cache rebuilds.

use crate::error::{ExportMapError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait CancellationToken {
    fn is_cancellation_requested(&self) -> bool;

    fn throw_if_cancellation_requested(&self) -> Result<()> {
        if self.is_cancellation_requested() {
            Err(ExportMapError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Token that is never cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancellation_requested(&self) -> bool {
        false
    }
}

/// Flag-backed token; clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    requested: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }
}

impl CancellationToken for CancellationFlag {
    fn is_cancellation_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
