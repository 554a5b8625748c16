use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::Arc;

/// Cooperative cancellation flag.
///
/// The orchestrator polls this between scans and stops cleanly instead of
/// unwinding; clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    flag: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let signal = AbortSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_aborted());
        signal.trigger();
        assert!(clone.is_aborted());
    }
}
