/// Error taxonomy for bring-up, link monitoring and the RNG cache.
///
/// Transient conditions (`HardwareFault`, `SubmitError`) are absorbed by the
/// component that sees them. `BringupError` is fatal: the caller halts.
use core::fmt;

/// A hardware primitive reported a non-success status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareFault {
    /// The random block generator failed.
    RandomGenerate { status: u32 },
    /// The PHY status could not be read over MDIO.
    PhyRead { status: u32 },
}

impl fmt::Display for HardwareFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareFault::RandomGenerate { status } => {
                write!(f, "random generate failed (status {:#x})", status)
            }
            HardwareFault::PhyRead { status } => {
                write!(f, "PHY status read failed (status {:#x})", status)
            }
        }
    }
}

impl core::error::Error for HardwareFault {}

/// Failure to hand a call over to the stack context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The work queue is at its configured depth.
    QueueFull,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::QueueFull => write!(f, "stack handoff queue full"),
        }
    }
}

impl core::error::Error for SubmitError {}

/// The network stack refused to create the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// Driver initialization failed; no device to attach.
    NoDriver,
    /// The driver reported a MAC that is zero or multicast.
    InvalidMac([u8; 6]),
    /// The static netmask is not a contiguous prefix.
    InvalidNetmask,
    /// An interface is already registered with this stack.
    AlreadyRegistered,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::NoDriver => write!(f, "ethernet driver failed to initialize"),
            RegistrationError::InvalidMac(mac) => write!(
                f,
                "invalid MAC {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
            ),
            RegistrationError::InvalidNetmask => write!(f, "netmask is not a valid prefix"),
            RegistrationError::AlreadyRegistered => write!(f, "interface already registered"),
        }
    }
}

impl core::error::Error for RegistrationError {}

/// The scheduler could not create a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnError {
    pub task: &'static str,
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to create task {}", self.task)
    }
}

impl core::error::Error for SpawnError {}

/// Unrecoverable bring-up failure. There is no retry path for any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringupError {
    /// The stack never signalled readiness.
    Timeout { waited_ms: u64 },
    /// The network interface could not be created.
    Registration(RegistrationError),
    /// The stack task could not be started.
    Spawn(SpawnError),
    /// The configuration call could not be queued to the stack.
    Handoff(SubmitError),
}

impl fmt::Display for BringupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BringupError::Timeout { waited_ms } => {
                write!(f, "network stack not ready after {} ms", waited_ms)
            }
            BringupError::Registration(e) => write!(f, "net interface failed to initialize: {}", e),
            BringupError::Spawn(e) => write!(f, "{}", e),
            BringupError::Handoff(e) => write!(f, "{}", e),
        }
    }
}

impl core::error::Error for BringupError {}

impl From<RegistrationError> for BringupError {
    fn from(e: RegistrationError) -> Self {
        BringupError::Registration(e)
    }
}

impl From<SpawnError> for BringupError {
    fn from(e: SpawnError) -> Self {
        BringupError::Spawn(e)
    }
}

impl From<SubmitError> for BringupError {
    fn from(e: SubmitError) -> Self {
        BringupError::Handoff(e)
    }
}
