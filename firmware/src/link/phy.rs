/// DP83848 PHY status over MDIO.
///
/// Reads the standard BMSR and the vendor PHYSTS register and packs them into
/// the `PhyStatus` word that `LinkMonitor` consumes.
use crate::error::HardwareFault;

use super::PhyStatus;

/// Standard MII registers.
const MII_BMSR: u8 = 0x01;
/// DP83848 PHY status register.
const DP83848_PHYSTS: u8 = 0x10;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Bmsr: u16 {
        const LINK_STATUS   = 1 << 2;
        const ANEG_COMPLETE = 1 << 5;
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct PhySts: u16 {
        const LINK   = 1 << 0;
        /// Set for 10 Mb/s, clear for 100 Mb/s.
        const SPEED_10 = 1 << 1;
        const DUPLEX = 1 << 2;
    }
}

/// Management bus to the PHY.
pub trait MiiBus {
    fn read(&mut self, phy_addr: u8, reg: u8) -> Result<u16, HardwareFault>;
}

/// DP83848 at a fixed MDIO address.
pub struct Dp83848Phy<M> {
    bus: M,
    addr: u8,
}

impl<M: MiiBus> Dp83848Phy<M> {
    pub fn new(bus: M, addr: u8) -> Self {
        Self { bus, addr }
    }

    /// Read the PHY and build a `PhyStatus` word with `VALID` set.
    ///
    /// BMSR link status is latched-low, so it is read twice and the second
    /// value is used.
    pub fn read_status(&mut self) -> Result<u32, HardwareFault> {
        self.bus.read(self.addr, MII_BMSR)?;
        let bmsr = Bmsr::from_bits_truncate(self.bus.read(self.addr, MII_BMSR)?);

        let mut status = PhyStatus::VALID;
        if !bmsr.contains(Bmsr::LINK_STATUS) {
            return Ok(status.bits());
        }

        let physts = PhySts::from_bits_truncate(self.bus.read(self.addr, DP83848_PHYSTS)?);
        if physts.contains(PhySts::LINK) {
            status |= PhyStatus::LINK_UP;
        }
        if !physts.contains(PhySts::SPEED_10) {
            status |= PhyStatus::SPEED_100;
        }
        if physts.contains(PhySts::DUPLEX) {
            status |= PhyStatus::FULL_DUPLEX;
        }
        Ok(status.bits())
    }

    /// Whether auto-negotiation has finished.
    pub fn autoneg_complete(&mut self) -> Result<bool, HardwareFault> {
        let bmsr = Bmsr::from_bits_truncate(self.bus.read(self.addr, MII_BMSR)?);
        Ok(bmsr.contains(Bmsr::ANEG_COMPLETE))
    }

    pub fn into_bus(self) -> M {
        self.bus
    }
}
