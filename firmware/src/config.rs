/// Build-time network configuration and bring-up tunables.
use smoltcp::wire::Ipv4Address;

use crate::platform::TaskSpec;

/// Board address used when the `dhcp` feature is off.
pub const STATIC_ADDRESS: Ipv4Address = Ipv4Address::new(10, 1, 10, 234);
pub const STATIC_NETMASK: Ipv4Address = Ipv4Address::new(255, 255, 255, 0);
pub const STATIC_GATEWAY: Ipv4Address = Ipv4Address::new(10, 1, 10, 1);

/// Delay between PHY polls in the monitor loop.
pub const LINK_POLL_MS: u64 = 250;

/// Context that runs bring-up and the link monitor loop.
pub const SETUP_TASK: TaskSpec = TaskSpec {
    name: "SetupIFx",
    stack_size: 512,
    priority: 1,
};

/// How the interface obtains its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Static,
    /// Address comes from a lease; fields start unspecified.
    Dynamic,
}

/// Interface addressing, fixed for the lifetime of the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceConfig {
    pub mode: AddressMode,
    pub address: Ipv4Address,
    pub netmask: Ipv4Address,
    pub gateway: Ipv4Address,
}

impl InterfaceConfig {
    pub const fn fixed(address: Ipv4Address, netmask: Ipv4Address, gateway: Ipv4Address) -> Self {
        Self {
            mode: AddressMode::Static,
            address,
            netmask,
            gateway,
        }
    }

    pub const fn dynamic() -> Self {
        Self {
            mode: AddressMode::Dynamic,
            address: Ipv4Address::UNSPECIFIED,
            netmask: Ipv4Address::UNSPECIFIED,
            gateway: Ipv4Address::UNSPECIFIED,
        }
    }

    /// The configuration selected by the `dhcp` feature.
    pub const fn from_build() -> Self {
        if cfg!(feature = "dhcp") {
            Self::dynamic()
        } else {
            Self::fixed(STATIC_ADDRESS, STATIC_NETMASK, STATIC_GATEWAY)
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.mode == AddressMode::Dynamic
    }
}

/// Tunables for `NetBringup`.
#[derive(Debug, Clone, Copy)]
pub struct BringupConfig {
    pub interface: InterfaceConfig,
    /// Bound on the wait for stack readiness; `None` waits forever.
    pub ready_timeout_ms: Option<u64>,
    pub poll_interval_ms: u64,
    /// Maximum queued stack calls before `submit` reports `QueueFull`.
    pub handoff_depth: usize,
    /// Block the monitor until each link update has been applied.
    pub block_on_link_update: bool,
    pub stack_task: TaskSpec,
    /// Idle time of the stack context between two steps.
    pub stack_tick_ms: u64,
    pub ethernet_irq_priority: u8,
}

impl Default for BringupConfig {
    fn default() -> Self {
        Self {
            interface: InterfaceConfig::from_build(),
            ready_timeout_ms: None,
            poll_interval_ms: LINK_POLL_MS,
            handoff_depth: 8,
            block_on_link_update: true,
            stack_task: TaskSpec {
                name: "tcpip",
                stack_size: 1024,
                priority: 3,
            },
            stack_tick_ms: 5,
            ethernet_irq_priority: 6,
        }
    }
}
