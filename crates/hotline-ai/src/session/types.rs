//! Single-flight guard for turn execution.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Guard that clears the `busy` flag on drop, so that no exit path (early
/// return, error, cancelled future) can leave a session permanently busy.
pub(super) struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    /// Attempt to take the flag. Returns `None` if a turn is already in
    /// flight; contention is not an error here, the caller drops the turn.
    pub(super) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then(|| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
