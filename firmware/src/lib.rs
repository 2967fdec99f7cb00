#![cfg_attr(not(test), no_std)]

//! Ethernet bring-up for an RTOS-hosted TCP/IP stack.
//!
//! `NetBringup` starts the stack context, registers the interface through the
//! `StackHandoff` queue, enables the Ethernet interrupt and then watches the
//! PHY, forwarding link changes to the stack. `RandomWordCache` feeds the
//! stack's random number needs from a block-oriented hardware generator.

extern crate alloc;

pub mod arch;
pub mod bringup;
pub mod config;
pub mod error;
pub mod handoff;
pub mod link;
pub mod net;
pub mod platform;
pub mod rng;

#[cfg(test)]
mod testing;

pub use bringup::{BringupState, CycleReport, LinkUpdate, NetBringup};
pub use config::{AddressMode, BringupConfig, InterfaceConfig};
pub use error::{BringupError, HardwareFault, RegistrationError, SpawnError, SubmitError};
pub use handoff::{StackHandoff, StackWorker};
pub use link::{LinkMonitor, LinkParams, LinkStatus, PhyStatus};
pub use net::{Ipv4Info, NetworkStack, SmoltcpStack};
pub use platform::{Board, Scheduler, TaskSpec};
pub use rng::{RandomBlock, RandomWordCache};
