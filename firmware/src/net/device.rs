/// Ethernet MAC driver seam.
///
/// smoltcp moves frames through `phy::Device`; bring-up additionally needs the
/// driver's init hook (which yields the MAC address) and a way to reprogram
/// speed and duplex when the PHY renegotiates.
use smoltcp::phy::Device;
use smoltcp::wire::EthernetAddress;

use crate::link::{Duplex, LinkSpeed};

/// A MAC driver the stack can register as its interface.
pub trait EthernetDriver: Device {
    /// Bring up the MAC and DMA rings. Returns the station address, or
    /// `None` if the hardware did not come up.
    fn init(&mut self) -> Option<[u8; 6]>;

    fn set_speed(&mut self, speed: LinkSpeed);

    fn set_duplex(&mut self, duplex: Duplex);
}

/// A unicast, non-zero MAC usable as a station address.
pub(crate) fn valid_station_mac(mac: [u8; 6]) -> bool {
    let addr = EthernetAddress(mac);
    addr.is_unicast() && mac != [0; 6]
}
