/// Seams to the scheduler and the board.
///
/// The core never talks to an RTOS or to registers directly. A board support
/// package implements these two traits and hands them to `NetBringup`.
use alloc::boxed::Box;

use crate::error::{HardwareFault, SpawnError};

/// Parameters for creating an execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: &'static str,
    pub stack_size: usize,
    pub priority: u8,
}

/// Preemptive scheduler services used by the core.
///
/// `sleep_ms` must suspend the caller and let other ready contexts run.
pub trait Scheduler: Clone + Send + Sync + 'static {
    /// Create a new context running `entry`.
    fn spawn(&self, task: TaskSpec, entry: Box<dyn FnOnce() + Send + 'static>) -> Result<(), SpawnError>;

    /// Suspend the calling context for at least `ms` milliseconds.
    fn sleep_ms(&self, ms: u64);

    /// Monotonic milliseconds since boot.
    fn now_ms(&self) -> u64;
}

/// Board hardware the bring-up sequence touches.
pub trait Board {
    /// Read the PHY status word (see `link::PhyStatus` for the layout).
    fn read_phy_status(&mut self) -> Result<u32, HardwareFault>;

    /// Unmask the Ethernet MAC interrupt at the given priority.
    fn enable_ethernet_irq(&mut self, priority: u8);

    /// Mask every interrupt source.
    fn disable_interrupts(&mut self);

    /// Drive the link indicator LED.
    fn set_link_led(&mut self, _on: bool) {}

    /// Stop forward progress. Called with interrupts already disabled.
    fn halt(&mut self) -> ! {
        loop {
            core::hint::spin_loop();
        }
    }
}
