/// TCP/IP network stack built on smoltcp.
///
/// Provides:
/// - interface registration with static or leased addressing
/// - DHCPv4 lease tracking (address, netmask, router)
/// - link gating: nothing is polled while admin-down or without carrier
/// - the TCP echo service
use alloc::vec;

use log::{info, warn};
use smoltcp::iface::{Config, Interface, SocketHandle, SocketSet};
use smoltcp::socket::dhcpv4;
use smoltcp::time::Instant;
use smoltcp::wire::{EthernetAddress, IpCidr, Ipv4Address, Ipv4Cidr};

use super::device::{valid_station_mac, EthernetDriver};
use super::echo::EchoService;
use super::{Ipv4Info, NetworkStack};
use crate::config::{AddressMode, InterfaceConfig};
use crate::error::RegistrationError;
use crate::link::LinkParams;

/// Network stack state. Lives on the stack context only.
pub struct SmoltcpStack<D: EthernetDriver> {
    driver: D,
    iface: Option<Interface>,
    sockets: SocketSet<'static>,
    random_seed: u64,
    dhcp: Option<SocketHandle>,
    echo_port: Option<u16>,
    echo: Option<EchoService>,
    info: Ipv4Info,
    static_gateway: Option<Ipv4Address>,
    is_default: bool,
    admin_up: bool,
    link: Option<LinkParams>,
}

impl<D: EthernetDriver> SmoltcpStack<D> {
    /// Wrap `driver`. The interface is created later by `register_interface`.
    pub fn new(driver: D, random_seed: u64) -> Self {
        Self {
            driver,
            iface: None,
            sockets: SocketSet::new(vec![]),
            random_seed,
            dhcp: None,
            echo_port: None,
            echo: None,
            info: Ipv4Info::UNASSIGNED,
            static_gateway: None,
            is_default: false,
            admin_up: false,
            link: None,
        }
    }

    /// Serve TCP echo on `port` once the interface exists.
    pub fn with_echo(mut self, port: u16) -> Self {
        self.echo_port = Some(port);
        self
    }

    pub fn is_registered(&self) -> bool {
        self.iface.is_some()
    }

    pub fn is_up(&self) -> bool {
        self.admin_up
    }

    pub fn link(&self) -> Option<LinkParams> {
        self.link
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn lease_started(&self) -> bool {
        self.dhcp.is_some()
    }

    pub fn echo(&self) -> Option<&EchoService> {
        self.echo.as_ref()
    }

    pub fn sockets(&self) -> &SocketSet<'static> {
        &self.sockets
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    fn instant(now_ms: u64) -> Instant {
        Instant::from_millis(now_ms as i64)
    }
}

impl<D: EthernetDriver> NetworkStack for SmoltcpStack<D> {
    fn register_interface(&mut self, config: &InterfaceConfig, now_ms: u64) -> Result<(), RegistrationError> {
        if self.iface.is_some() {
            return Err(RegistrationError::AlreadyRegistered);
        }

        let cidr = match config.mode {
            AddressMode::Static => Some(
                Ipv4Cidr::from_netmask(config.address, config.netmask)
                    .map_err(|_| RegistrationError::InvalidNetmask)?,
            ),
            AddressMode::Dynamic => None,
        };

        let mac = self.driver.init().ok_or(RegistrationError::NoDriver)?;
        if !valid_station_mac(mac) {
            return Err(RegistrationError::InvalidMac(mac));
        }

        let mut iface_config = Config::new(EthernetAddress(mac).into());
        iface_config.random_seed = self.random_seed;
        let mut iface = Interface::new(iface_config, &mut self.driver, Self::instant(now_ms));

        if let Some(cidr) = cidr {
            iface.update_ip_addrs(|addrs| {
                addrs.push(IpCidr::Ipv4(cidr)).ok();
            });
            self.info = Ipv4Info {
                address: config.address,
                netmask: config.netmask,
                gateway: config.gateway,
            };
            if !config.gateway.is_unspecified() {
                self.static_gateway = Some(config.gateway);
            }
        }

        if let Some(port) = self.echo_port {
            self.echo = Some(EchoService::new(&mut self.sockets, port));
        }

        info!(target: "net", "interface registered, MAC {}", EthernetAddress(mac));
        self.iface = Some(iface);
        Ok(())
    }

    fn set_default(&mut self) {
        self.is_default = true;
        if let (Some(iface), Some(gateway)) = (self.iface.as_mut(), self.static_gateway) {
            if iface.routes_mut().add_default_ipv4_route(gateway).is_err() {
                warn!(target: "net", "route table full, no default route");
            }
        }
    }

    fn set_up(&mut self) {
        self.admin_up = true;
    }

    fn set_link_up(&mut self, params: LinkParams) {
        self.driver.set_speed(params.speed);
        self.driver.set_duplex(params.duplex);
        let carrier_returned = self.link.replace(params).is_none();

        // A new carrier may mean a new network: restart discovery. A speed or
        // duplex renegotiation keeps the lease.
        if carrier_returned {
            if let Some(handle) = self.dhcp {
                self.sockets.get_mut::<dhcpv4::Socket>(handle).reset();
            }
        }
    }

    fn set_link_down(&mut self) {
        self.link = None;
    }

    fn start_address_lease(&mut self) {
        if self.dhcp.is_none() {
            self.dhcp = Some(self.sockets.add(dhcpv4::Socket::new()));
            info!(target: "net", "DHCP discovery started");
        }
    }

    fn ipv4(&self) -> Ipv4Info {
        self.info
    }

    fn poll(&mut self, now_ms: u64) -> Option<u64> {
        if !self.admin_up || self.link.is_none() {
            return None;
        }
        let iface = self.iface.as_mut()?;
        let timestamp = Self::instant(now_ms);
        iface.poll(timestamp, &mut self.driver, &mut self.sockets);

        if let Some(handle) = self.dhcp {
            // Copy out of the event before touching the interface again.
            let lease = match self.sockets.get_mut::<dhcpv4::Socket>(handle).poll() {
                None => None,
                Some(dhcpv4::Event::Configured(config)) => Some(Some((config.address, config.router))),
                Some(dhcpv4::Event::Deconfigured) => Some(None),
            };

            match lease {
                Some(Some((cidr, router))) => {
                    iface.update_ip_addrs(|addrs| {
                        addrs.clear();
                        addrs.push(IpCidr::Ipv4(cidr)).ok();
                    });
                    match router {
                        Some(router) if self.is_default => {
                            iface.routes_mut().add_default_ipv4_route(router).ok();
                        }
                        _ => {
                            iface.routes_mut().remove_default_ipv4_route();
                        }
                    }
                    self.info = Ipv4Info {
                        address: cidr.address(),
                        netmask: cidr.netmask(),
                        gateway: router.unwrap_or(Ipv4Address::UNSPECIFIED),
                    };
                    info!(target: "net", "DHCP lease {}", cidr);
                }
                Some(None) => {
                    iface.update_ip_addrs(|addrs| addrs.clear());
                    iface.routes_mut().remove_default_ipv4_route();
                    self.info = Ipv4Info::UNASSIGNED;
                    warn!(target: "net", "DHCP lease lost");
                }
                None => {}
            }
        }

        if let Some(echo) = self.echo.as_mut() {
            echo.service(&mut self.sockets);
        }

        iface.poll_delay(timestamp, &self.sockets).map(|d| d.total_millis())
    }
}
