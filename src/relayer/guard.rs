//! Batch guard - at most one `batchCallByBot` in flight per relayer

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::RelayerError;

/// Flag that is set while a batch executes
#[derive(Debug, Default)]
pub struct BatchFlag(Arc<AtomicBool>);

impl BatchFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the flag for the lifetime of the returned guard
    pub fn enter(&self) -> Result<BatchGuard, RelayerError> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RelayerError::AlreadyInBatchCallByBot)?;

        Ok(BatchGuard {
            flag: Arc::clone(&self.0),
        })
    }
}

/// Clears the batch flag when dropped, on success, error and unwind alike
#[derive(Debug)]
pub struct BatchGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
