use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress reporting plus cooperative cancellation.
///
/// Cancellation is only polled, never forced: a running request or
/// compiler process always finishes before the check is made.
pub trait ProgressIndicator: Send + Sync {
    fn is_canceled(&self) -> bool;

    fn set_text(&self, text: &str);
}

/// Indicator that shows nothing and is never canceled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressIndicator for NoProgress {
    fn is_canceled(&self) -> bool {
        false
    }

    fn set_text(&self, _text: &str) {}
}

/// Shared flag that flips an indicator to canceled.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    canceled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }
}

impl ProgressIndicator for CancellationFlag {
    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    fn set_text(&self, text: &str) {
        tracing::debug!(progress = text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_flag_is_shared() {
        let flag = CancellationFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_canceled());
        flag.cancel();
        assert!(clone.is_canceled());
    }
}
