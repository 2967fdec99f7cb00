/// The stack context: sole owner of the `NetworkStack`.
use alloc::boxed::Box;
use alloc::sync::Arc;

use log::info;

use super::StackHandoff;
use crate::error::SpawnError;
use crate::net::{AddressCell, NetworkStack};
use crate::platform::{Scheduler, TaskSpec};

pub struct StackWorker<N, Sch> {
    stack: N,
    handoff: Arc<StackHandoff<N>>,
    address: Arc<AddressCell>,
    sched: Sch,
    tick_ms: u64,
}

impl<N, Sch> StackWorker<N, Sch>
where
    N: NetworkStack + Send + 'static,
    Sch: Scheduler,
{
    pub fn new(
        stack: N,
        handoff: Arc<StackHandoff<N>>,
        address: Arc<AddressCell>,
        sched: Sch,
        tick_ms: u64,
    ) -> Self {
        Self {
            stack,
            handoff,
            address,
            sched,
            tick_ms,
        }
    }

    /// Start the stack context. `on_ready` runs on that context once the
    /// stack is up, before the first queued call is applied.
    pub fn spawn<F>(self, task: TaskSpec, on_ready: F) -> Result<(), SpawnError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sched = self.sched.clone();
        sched.spawn(task, Box::new(move || self.run(on_ready)))
    }

    /// Context body. Never returns.
    pub fn run<F: FnOnce()>(mut self, on_ready: F) -> ! {
        info!(target: "net", "stack context running");
        on_ready();
        loop {
            let idle = self.step();
            self.sched.sleep_ms(idle);
        }
    }

    /// Apply queued calls, poll the stack, publish its addressing.
    /// Returns how long to idle before the next step.
    pub fn step(&mut self) -> u64 {
        self.handoff.drain(&mut self.stack);
        let delay = self.stack.poll(self.sched.now_ms());
        self.address.publish(self.stack.ipv4());
        delay.map_or(self.tick_ms, |d| d.min(self.tick_ms))
    }

    pub fn stack(&self) -> &N {
        &self.stack
    }
}
