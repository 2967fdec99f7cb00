/// Handoff of state-mutating calls to the context that owns the stack.
///
/// The stack's interface structures may only be touched from its own
/// context. Every other context packages the mutation as a closure and
/// submits it here; the stack context drains the queue in FIFO order between
/// polls.
///
/// ```text
///   monitor context                    stack context
///   ───────────────                    ─────────────
///   submit(call) ──▶ [ bounded FIFO ] ──▶ drain(&mut stack)
///        │                                   │
///        └──── waits on done latch ◀─────────┘ (blocking submit)
/// ```
mod latch;
pub mod worker;

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU32, Ordering};

use spin::Mutex;

use crate::error::SubmitError;
use crate::platform::Scheduler;

pub use latch::{Readiness, ReadinessLatch};
pub use worker::StackWorker;

/// A mutation to run on the stack context.
pub type StackCall<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

struct Job<S> {
    call: StackCall<S>,
    done: Option<Arc<ReadinessLatch>>,
}

/// Counters for diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HandoffStats {
    pub submitted: u32,
    pub applied: u32,
    pub dropped: u32,
}

/// Bounded call queue plus the stack's readiness latch.
pub struct StackHandoff<S> {
    jobs: Mutex<VecDeque<Job<S>>>,
    depth: usize,
    ready: ReadinessLatch,
    submitted: AtomicU32,
    applied: AtomicU32,
    dropped: AtomicU32,
}

impl<S> StackHandoff<S> {
    /// Create a handoff that holds at most `depth` pending calls.
    pub fn new(depth: usize) -> Self {
        Self {
            jobs: Mutex::new(VecDeque::with_capacity(depth)),
            depth,
            ready: ReadinessLatch::new(),
            submitted: AtomicU32::new(0),
            applied: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Mark the stack context as started. Only the first call has effect.
    pub fn signal_ready(&self) -> bool {
        self.ready.set()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_set()
    }

    /// Block until the stack context signals readiness.
    pub fn await_ready<Sch: Scheduler>(&self, sched: &Sch, timeout_ms: Option<u64>) -> Readiness {
        self.ready.wait(sched, timeout_ms)
    }

    /// Queue `call` for the stack context.
    ///
    /// With `block_until_applied` the caller is suspended until the stack
    /// context has run the call. Otherwise only FIFO order relative to other
    /// submissions is guaranteed.
    pub fn submit<Sch, F>(&self, sched: &Sch, call: F, block_until_applied: bool) -> Result<(), SubmitError>
    where
        Sch: Scheduler,
        F: FnOnce(&mut S) + Send + 'static,
    {
        let done = block_until_applied.then(|| Arc::new(ReadinessLatch::new()));
        self.enqueue(Job {
            call: Box::new(call),
            done: done.clone(),
        })?;

        if let Some(done) = done {
            done.wait(sched, None);
        }
        Ok(())
    }

    /// Run `f` on the stack context and return its result to the caller.
    pub fn call<Sch, R, F>(&self, sched: &Sch, f: F) -> Result<R, SubmitError>
    where
        Sch: Scheduler,
        R: Send + 'static,
        F: FnOnce(&mut S) -> R + Send + 'static,
    {
        let slot: Arc<Mutex<Option<R>>> = Arc::new(Mutex::new(None));
        let out = slot.clone();
        self.enqueue(Job {
            call: Box::new(move |stack| *out.lock() = Some(f(stack))),
            done: None,
        })?;

        loop {
            if let Some(value) = slot.lock().take() {
                return Ok(value);
            }
            sched.sleep_ms(1);
        }
    }

    /// Run every queued call against `stack`, oldest first.
    ///
    /// Must only be called from the stack context. Returns the number of
    /// calls applied.
    pub fn drain(&self, stack: &mut S) -> usize {
        let mut applied = 0;
        while let Some(job) = self.pop() {
            (job.call)(stack);
            if let Some(done) = job.done {
                done.set();
            }
            applied += 1;
        }
        if applied > 0 {
            self.applied.fetch_add(applied as u32, Ordering::Relaxed);
        }
        applied
    }

    /// Calls queued but not yet applied.
    pub fn pending(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn stats(&self) -> HandoffStats {
        HandoffStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    fn enqueue(&self, job: Job<S>) -> Result<(), SubmitError> {
        let mut jobs = self.jobs.lock();
        if jobs.len() >= self.depth {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(SubmitError::QueueFull);
        }
        jobs.push_back(job);
        self.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    // The guard drops here, so calls never run under the queue lock.
    fn pop(&self) -> Option<Job<S>> {
        self.jobs.lock().pop_front()
    }
}
