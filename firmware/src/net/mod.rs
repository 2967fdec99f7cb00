/// Network stack seam and its smoltcp implementation.
///
/// Architecture:
///   EthernetDriver (MAC + DMA, raw frames)
///       ↓ ↑
///   SmoltcpStack (Interface, DHCPv4 lease, echo service)
///       ↓ ↑
///   StackWorker (owns the stack, drains the handoff queue)
///
/// Only the stack context holds the `NetworkStack`. Other contexts read the
/// published `AddressCell` snapshot.
pub mod device;
pub mod echo;
pub mod stack;

use smoltcp::wire::Ipv4Address;
use spin::Mutex;

use crate::config::InterfaceConfig;
use crate::error::RegistrationError;
use crate::link::LinkParams;

pub use device::EthernetDriver;
pub use stack::SmoltcpStack;

/// Address, netmask and gateway of the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Info {
    pub address: Ipv4Address,
    pub netmask: Ipv4Address,
    pub gateway: Ipv4Address,
}

impl Ipv4Info {
    pub const UNASSIGNED: Ipv4Info = Ipv4Info {
        address: Ipv4Address::UNSPECIFIED,
        netmask: Ipv4Address::UNSPECIFIED,
        gateway: Ipv4Address::UNSPECIFIED,
    };

    pub fn is_assigned(&self) -> bool {
        !self.address.is_unspecified()
    }
}

/// Operations the bring-up sequence needs from the network stack.
///
/// All methods run on the stack context only.
pub trait NetworkStack {
    /// Create the interface with the given addressing.
    fn register_interface(&mut self, config: &InterfaceConfig, now_ms: u64) -> Result<(), RegistrationError>;

    /// Make the interface the default route.
    fn set_default(&mut self);

    /// Administratively enable the interface.
    fn set_up(&mut self);

    /// Carrier present; reprogram the MAC for the negotiated link.
    fn set_link_up(&mut self, params: LinkParams);

    fn set_link_down(&mut self);

    /// Begin dynamic address acquisition.
    fn start_address_lease(&mut self);

    /// Current addressing of the interface.
    fn ipv4(&self) -> Ipv4Info;

    /// Process traffic and timers. Returns how long the stack may idle.
    fn poll(&mut self, now_ms: u64) -> Option<u64>;
}

/// Latest interface addressing, written by the stack context.
#[derive(Debug)]
pub struct AddressCell {
    info: Mutex<Ipv4Info>,
}

impl AddressCell {
    pub const fn new() -> Self {
        Self {
            info: Mutex::new(Ipv4Info::UNASSIGNED),
        }
    }

    pub fn publish(&self, info: Ipv4Info) {
        *self.info.lock() = info;
    }

    pub fn get(&self) -> Ipv4Info {
        *self.info.lock()
    }
}

impl Default for AddressCell {
    fn default() -> Self {
        Self::new()
    }
}
