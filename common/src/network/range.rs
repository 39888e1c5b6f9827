use std::net::{IpAddr, Ipv4Addr};

use pnet::ipnetwork::Ipv4Network;

/// Inclusive span of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    /// Builds a range, swapping the bounds if they were given backwards.
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        if u32::from(start_addr) <= u32::from(end_addr) {
            Self { start_addr, end_addr }
        } else {
            Self {
                start_addr: end_addr,
                end_addr: start_addr,
            }
        }
    }

    pub fn len(&self) -> usize {
        (u32::from(self.end_addr) - u32::from(self.start_addr)) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn to_iter(&self) -> impl Iterator<Item = IpAddr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(|ip| IpAddr::V4(Ipv4Addr::from(ip)))
    }
}

/// Usable host addresses of a CIDR block.
///
/// Network and broadcast addresses are stripped when the block is large
/// enough to have them.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = Ipv4Network::new(ip, prefix)?;
    let start: u32 = network.network().into();
    let end: u32 = network.broadcast().into();

    if prefix >= 31 {
        return Ok(Ipv4Range::new(Ipv4Addr::from(start), Ipv4Addr::from(end)));
    }

    Ok(Ipv4Range::new(
        Ipv4Addr::from(start.saturating_add(1)),
        Ipv4Addr::from(end.saturating_sub(1)),
    ))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
