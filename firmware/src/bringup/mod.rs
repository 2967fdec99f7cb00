/// Network bring-up and the PHY link monitor loop.
///
/// Sequence:
///   1. spawn the stack context, wait for its ready callback
///   2. register the interface, make it default, mark it up (on the stack context)
///   3. enable the Ethernet interrupt (only now: an earlier IRQ would find no interface)
///   4. start the address lease in Dynamic mode
///   5. poll the PHY forever, pushing link transitions through the handoff
use alloc::boxed::Box;
use alloc::sync::Arc;

use log::{error, info, warn};

use crate::config::BringupConfig;
use crate::error::{BringupError, RegistrationError, SpawnError, SubmitError};
use crate::handoff::{Readiness, StackHandoff, StackWorker};
use crate::link::{LinkMonitor, LinkStatus, PhyStatus};
use crate::net::{AddressCell, Ipv4Info, NetworkStack};
use crate::platform::{Board, Scheduler, TaskSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringupState {
    Idle,
    WaitingForStackReady,
    ConfiguringInterface,
    Running,
}

/// What happened to a link transition in one monitor cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkUpdate {
    #[default]
    None,
    /// Applied by the stack before the cycle continued.
    Applied,
    /// Queued without waiting.
    Queued,
    /// Queue full; re-sent on the next valid read.
    Dropped,
}

/// Outcome of one monitor cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    /// `None` when the PHY read failed.
    pub status: Option<LinkStatus>,
    pub link_update: LinkUpdate,
    /// Set on the one cycle that announced the interface address.
    pub announced: Option<Ipv4Info>,
}

/// Bring-up orchestrator. Owns everything the monitor context touches.
pub struct NetBringup<B, Sch, N> {
    config: BringupConfig,
    board: B,
    sched: Sch,
    handoff: Arc<StackHandoff<N>>,
    address: Arc<AddressCell>,
    monitor: LinkMonitor,
    state: BringupState,
    announced: bool,
    resync: bool,
}

impl<B, Sch, N> NetBringup<B, Sch, N>
where
    B: Board,
    Sch: Scheduler,
    N: NetworkStack + Send + 'static,
{
    pub fn new(config: BringupConfig, board: B, sched: Sch) -> Self {
        Self {
            handoff: Arc::new(StackHandoff::new(config.handoff_depth)),
            address: Arc::new(AddressCell::new()),
            config,
            board,
            sched,
            monitor: LinkMonitor::new(),
            state: BringupState::Idle,
            announced: false,
            resync: false,
        }
    }

    pub fn state(&self) -> BringupState {
        self.state
    }

    pub fn handoff(&self) -> &Arc<StackHandoff<N>> {
        &self.handoff
    }

    /// Addressing last published by the stack context.
    pub fn address(&self) -> Ipv4Info {
        self.address.get()
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    /// Forget the last link state so the next valid read is pushed again.
    /// For boards that re-initialise the PHY.
    pub fn reset_link_baseline(&mut self) {
        self.monitor.reset();
    }

    /// Start this orchestrator on its own context.
    pub fn spawn(self, task: TaskSpec, stack: N) -> Result<(), SpawnError>
    where
        B: Send + 'static,
    {
        let sched = self.sched.clone();
        sched.spawn(task, Box::new(move || self.run(stack)))
    }

    /// Bring the network up, then monitor the link forever.
    pub fn run(mut self, stack: N) -> ! {
        if let Err(e) = self.bring_up(stack) {
            self.fatal(e);
        }
        loop {
            self.monitor_cycle();
            self.sched.sleep_ms(self.config.poll_interval_ms);
        }
    }

    /// Run the bring-up sequence up to `Running`. Call once.
    pub fn bring_up(&mut self, stack: N) -> Result<(), BringupError> {
        self.state = BringupState::WaitingForStackReady;
        info!(target: "net", "Waiting for TCPIP thread to initialize...");

        let ready = self.handoff.clone();
        StackWorker::new(
            stack,
            self.handoff.clone(),
            self.address.clone(),
            self.sched.clone(),
            self.config.stack_tick_ms,
        )
        .spawn(self.config.stack_task, move || {
            ready.signal_ready();
        })?;

        let started = self.sched.now_ms();
        if self.handoff.await_ready(&self.sched, self.config.ready_timeout_ms) == Readiness::TimedOut {
            return Err(BringupError::Timeout {
                waited_ms: self.sched.now_ms().saturating_sub(started),
            });
        }

        self.state = BringupState::ConfiguringInterface;
        let iface = self.config.interface;
        let clock = self.sched.clone();
        self.handoff.call(&self.sched, move |stack: &mut N| {
            stack.register_interface(&iface, clock.now_ms())?;
            stack.set_default();
            stack.set_up();
            Ok::<(), RegistrationError>(())
        })??;

        self.board.enable_ethernet_irq(self.config.ethernet_irq_priority);
        self.state = BringupState::Running;
        info!(target: "net", "interface up ({:?} addressing)", iface.mode);

        if iface.is_dynamic() {
            self.handoff
                .submit(&self.sched, |stack: &mut N| stack.start_address_lease(), true)?;
        }
        Ok(())
    }

    /// One iteration of the `Running` loop, without the trailing sleep.
    pub fn monitor_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        match self.board.read_phy_status() {
            Ok(raw) => {
                let status = self.monitor.poll(raw);
                report.status = Some(status);
                let resync = self.resync && PhyStatus::is_valid_read(raw);
                if status.changed || resync {
                    report.link_update = self.push_link_state(status);
                }
            }
            Err(fault) => {
                warn!(target: "phy", "{}, keeping previous link state", fault);
            }
        }

        report.announced = self.announce_address();
        report
    }

    /// Log, mask interrupts and stop. Used for unrecoverable bring-up errors.
    pub fn fatal(&mut self, err: BringupError) -> ! {
        error!(target: "net", "{}", err);
        self.board.disable_interrupts();
        self.board.halt()
    }

    fn push_link_state(&mut self, status: LinkStatus) -> LinkUpdate {
        self.board.set_link_led(status.connected);
        info!(target: "phy", "Link connect status: {}", status.connected as u8);

        let block = self.config.block_on_link_update;
        let submitted = match status.params() {
            Some(params) => {
                info!(target: "phy", "{} Mb/s, {:?} duplex", params.bits_per_second() / 1_000_000, params.duplex);
                self.handoff
                    .submit(&self.sched, move |stack: &mut N| stack.set_link_up(params), block)
            }
            None => self
                .handoff
                .submit(&self.sched, |stack: &mut N| stack.set_link_down(), block),
        };

        match submitted {
            Ok(()) => {
                self.resync = false;
                if block {
                    LinkUpdate::Applied
                } else {
                    LinkUpdate::Queued
                }
            }
            Err(SubmitError::QueueFull) => {
                warn!(target: "phy", "link update dropped, stack queue full");
                self.resync = true;
                LinkUpdate::Dropped
            }
        }
    }

    /// Announce the address the first time it is non-zero. Never re-arms.
    fn announce_address(&mut self) -> Option<Ipv4Info> {
        if self.announced {
            return None;
        }
        let info = self.address.get();
        if !info.is_assigned() {
            return None;
        }
        self.announced = true;
        info!(target: "net", "IP_ADDR    : {}", info.address);
        info!(target: "net", "NET_MASK   : {}", info.netmask);
        info!(target: "net", "GATEWAY_IP : {}", info.gateway);
        Some(info)
    }
}
