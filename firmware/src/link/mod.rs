/// PHY link monitoring.
///
/// `LinkMonitor` turns the raw PHY status word into a `LinkStatus` and flags
/// transitions. It compares each decoded value against the immediately
/// preceding one, so a change is reported exactly once.
pub mod phy;

bitflags::bitflags! {
    /// Raw PHY status word as delivered by `Board::read_phy_status`.
    ///
    /// `VALID` is set once an MDIO read has completed. The reset value `0`
    /// therefore means "nothing read yet", not "link down".
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PhyStatus: u32 {
        const LINK_UP     = 1 << 0;
        const SPEED_100   = 1 << 1;
        const FULL_DUPLEX = 1 << 2;
        const VALID       = 1 << 7;
    }
}

impl PhyStatus {
    /// Whether `raw` comes from a completed read.
    pub fn is_valid_read(raw: u32) -> bool {
        PhyStatus::from_bits_truncate(raw).contains(PhyStatus::VALID)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSpeed {
    Speed10,
    Speed100,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplex {
    Half,
    Full,
}

/// Negotiated parameters of a connected link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkParams {
    pub speed: LinkSpeed,
    pub duplex: Duplex,
}

impl LinkParams {
    pub fn bits_per_second(&self) -> u32 {
        match self.speed {
            LinkSpeed::Speed10 => 10_000_000,
            LinkSpeed::Speed100 => 100_000_000,
        }
    }
}

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStatus {
    pub connected: bool,
    pub speed_high: bool,
    pub full_duplex: bool,
    /// Differs from the previous decoded status.
    pub changed: bool,
}

impl LinkStatus {
    /// Speed and duplex to program into the MAC, if connected.
    pub fn params(&self) -> Option<LinkParams> {
        if !self.connected {
            return None;
        }
        Some(LinkParams {
            speed: if self.speed_high { LinkSpeed::Speed100 } else { LinkSpeed::Speed10 },
            duplex: if self.full_duplex { Duplex::Full } else { Duplex::Half },
        })
    }
}

/// (connected, speed_high, full_duplex)
type Triple = (bool, bool, bool);

/// Change detector over successive PHY status words.
///
/// Owned by the single monitor context; holds only the last decoded value.
#[derive(Debug, Default)]
pub struct LinkMonitor {
    previous: Option<Triple>,
}

impl LinkMonitor {
    pub const fn new() -> Self {
        Self { previous: None }
    }

    /// Decode `raw` and compare it with the previous decoded value.
    pub fn poll(&mut self, raw: u32) -> LinkStatus {
        if !PhyStatus::is_valid_read(raw) {
            // No completed read yet: report down, keep the baseline unknown.
            return LinkStatus::default();
        }

        let bits = PhyStatus::from_bits_truncate(raw);
        let current = (
            bits.contains(PhyStatus::LINK_UP),
            bits.contains(PhyStatus::SPEED_100),
            bits.contains(PhyStatus::FULL_DUPLEX),
        );
        let changed = self.previous != Some(current);
        self.previous = Some(current);

        LinkStatus {
            connected: current.0,
            speed_high: current.1,
            full_duplex: current.2,
            changed,
        }
    }

    /// Forget the baseline; the next valid poll reports a change.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
