use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::PlannerError;

/// Shared flag polled by the parameter scans of a simulation session.
///
/// Cloning shares the flag, so a caller can keep one handle and cancel a
/// long recomputation started through another.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self, during: &str) -> Result<(), PlannerError> {
        if self.is_cancelled() {
            Err(PlannerError::Cancelled(during.to_string()))
        } else {
            Ok(())
        }
    }
}
