/// One-shot readiness signal.
use core::sync::atomic::{AtomicBool, Ordering};

use crate::platform::Scheduler;

/// Outcome of waiting on a latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Signaled,
    TimedOut,
}

/// Flag that is set once and never cleared.
#[derive(Debug, Default)]
pub struct ReadinessLatch {
    set: AtomicBool,
}

impl ReadinessLatch {
    pub const fn new() -> Self {
        Self { set: AtomicBool::new(false) }
    }

    /// Set the latch. Returns `false` if it was already set.
    pub fn set(&self) -> bool {
        !self.set.swap(true, Ordering::AcqRel)
    }

    pub fn is_set(&self) -> bool {
        self.set.load(Ordering::Acquire)
    }

    /// Suspend until the latch is set or `timeout_ms` has elapsed.
    ///
    /// `None` waits forever. The caller sleeps one millisecond between checks
    /// so other contexts (the one that will set the latch) can run.
    pub fn wait<S: Scheduler>(&self, sched: &S, timeout_ms: Option<u64>) -> Readiness {
        let start = sched.now_ms();
        loop {
            if self.is_set() {
                return Readiness::Signaled;
            }
            if let Some(limit) = timeout_ms {
                if sched.now_ms().saturating_sub(start) >= limit {
                    return Readiness::TimedOut;
                }
            }
            sched.sleep_ms(1);
        }
    }
}
