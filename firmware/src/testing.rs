/// Host-side doubles for the scheduler, the board and the network stack.
///
/// Only compiled for unit tests. The scheduler runs contexts as std threads.
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::time::{Duration, Instant};

use spin::Mutex;

use crate::config::{AddressMode, InterfaceConfig};
use crate::error::{HardwareFault, RegistrationError, SpawnError};
use crate::link::LinkParams;
use crate::net::{Ipv4Info, NetworkStack};
use crate::platform::{Board, Scheduler, TaskSpec};

/// What `spawn` does with new contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnMode {
    Thread,
    /// Accept the task but never run it.
    Discard,
    Refuse,
}

#[derive(Clone)]
pub struct ThreadScheduler {
    epoch: Instant,
    mode: SpawnMode,
    spawned: Arc<Mutex<Vec<&'static str>>>,
    /// `sleep_ms` arguments, tagged with the calling thread's name.
    sleeps: Arc<Mutex<Vec<(String, u64)>>>,
}

impl ThreadScheduler {
    pub fn new() -> Self {
        Self::with_mode(SpawnMode::Thread)
    }

    pub fn with_mode(mode: SpawnMode) -> Self {
        Self {
            epoch: Instant::now(),
            mode,
            spawned: Arc::new(Mutex::new(Vec::new())),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn spawned(&self) -> Vec<&'static str> {
        self.spawned.lock().clone()
    }

    /// Sleeps requested from the context spawned as `task`.
    pub fn sleeps_of(&self, task: &str) -> Vec<u64> {
        self.sleeps
            .lock()
            .iter()
            .filter(|(name, _)| name == task)
            .map(|&(_, ms)| ms)
            .collect()
    }
}

impl Scheduler for ThreadScheduler {
    fn spawn(&self, task: TaskSpec, entry: Box<dyn FnOnce() + Send + 'static>) -> Result<(), SpawnError> {
        match self.mode {
            SpawnMode::Refuse => Err(SpawnError { task: task.name }),
            SpawnMode::Discard => {
                self.spawned.lock().push(task.name);
                Ok(())
            }
            SpawnMode::Thread => {
                self.spawned.lock().push(task.name);
                std::thread::Builder::new()
                    .name(task.name.into())
                    .spawn(entry)
                    .map(|_| ())
                    .map_err(|_| SpawnError { task: task.name })
            }
        }
    }

    fn sleep_ms(&self, ms: u64) {
        if let Some(name) = std::thread::current().name() {
            self.sleeps.lock().push((name.into(), ms));
        }
        if ms == 0 {
            std::thread::yield_now();
        } else {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEvent {
    IrqEnabled(u8),
    InterruptsDisabled,
    Led(bool),
    Halted,
}

/// Board with a scripted PHY. Once the script runs dry the last good value
/// repeats.
pub struct MockBoard {
    phy: Arc<Mutex<VecDeque<Result<u32, HardwareFault>>>>,
    last: u32,
    pub events: Vec<BoardEvent>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            phy: Arc::new(Mutex::new(VecDeque::new())),
            last: 0,
            events: Vec::new(),
        }
    }

    /// Handle for feeding PHY reads after the board moved into `NetBringup`.
    pub fn phy_script(&self) -> Arc<Mutex<VecDeque<Result<u32, HardwareFault>>>> {
        self.phy.clone()
    }
}

impl Board for MockBoard {
    fn read_phy_status(&mut self) -> Result<u32, HardwareFault> {
        match self.phy.lock().pop_front() {
            Some(Ok(raw)) => {
                self.last = raw;
                Ok(raw)
            }
            Some(Err(fault)) => Err(fault),
            None => Ok(self.last),
        }
    }

    fn enable_ethernet_irq(&mut self, priority: u8) {
        self.events.push(BoardEvent::IrqEnabled(priority));
    }

    fn disable_interrupts(&mut self) {
        self.events.push(BoardEvent::InterruptsDisabled);
    }

    fn set_link_led(&mut self, on: bool) {
        self.events.push(BoardEvent::Led(on));
    }

    fn halt(&mut self) -> ! {
        self.events.push(BoardEvent::Halted);
        panic!("board halted");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEvent {
    Registered(AddressMode),
    SetDefault,
    SetUp,
    LinkUp(LinkParams),
    LinkDown,
    LeaseStarted,
}

/// Stack that records every call. The lease is granted by the test.
pub struct RecordingStack {
    events: Arc<Mutex<Vec<StackEvent>>>,
    lease: Arc<Mutex<Ipv4Info>>,
    info: Ipv4Info,
    lease_started: bool,
    fail_registration: Option<RegistrationError>,
}

impl RecordingStack {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            lease: Arc::new(Mutex::new(Ipv4Info::UNASSIGNED)),
            info: Ipv4Info::UNASSIGNED,
            lease_started: false,
            fail_registration: None,
        }
    }

    pub fn failing(err: RegistrationError) -> Self {
        Self {
            fail_registration: Some(err),
            ..Self::new()
        }
    }

    pub fn events(&self) -> Arc<Mutex<Vec<StackEvent>>> {
        self.events.clone()
    }

    /// Address the lease collaborator will hand out once written.
    pub fn lease(&self) -> Arc<Mutex<Ipv4Info>> {
        self.lease.clone()
    }
}

impl NetworkStack for RecordingStack {
    fn register_interface(&mut self, config: &InterfaceConfig, _now_ms: u64) -> Result<(), RegistrationError> {
        if let Some(err) = self.fail_registration {
            return Err(err);
        }
        if config.mode == AddressMode::Static {
            self.info = Ipv4Info {
                address: config.address,
                netmask: config.netmask,
                gateway: config.gateway,
            };
        }
        self.events.lock().push(StackEvent::Registered(config.mode));
        Ok(())
    }

    fn set_default(&mut self) {
        self.events.lock().push(StackEvent::SetDefault);
    }

    fn set_up(&mut self) {
        self.events.lock().push(StackEvent::SetUp);
    }

    fn set_link_up(&mut self, params: LinkParams) {
        self.events.lock().push(StackEvent::LinkUp(params));
    }

    fn set_link_down(&mut self) {
        self.events.lock().push(StackEvent::LinkDown);
    }

    fn start_address_lease(&mut self) {
        self.lease_started = true;
        self.events.lock().push(StackEvent::LeaseStarted);
    }

    fn ipv4(&self) -> Ipv4Info {
        if self.lease_started {
            *self.lease.lock()
        } else {
            self.info
        }
    }

    fn poll(&mut self, _now_ms: u64) -> Option<u64> {
        None
    }
}

/// Spin on `cond` for up to two seconds.
pub fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}
