//! # Sweep Targets
//!
//! Address sets handed to the TCP sweep enumerator. Accepted forms:
//! * A single IPv4/IPv6 address (`192.168.1.5`).
//! * An IPv4 range (`192.168.1.10-40` or `192.168.1.10-192.168.1.40`).
//! * A CIDR block (`192.168.1.0/24`).
//! * A comma-separated list of the above.

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::network::range::{self, Ipv4Range};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SweepTarget {
    Host { addr: IpAddr },
    Range { ipv4_range: Ipv4Range },
    Multi { targets: Vec<SweepTarget> },
}

impl SweepTarget {
    /// Expands the target into a de-duplicated, ordered set of addresses.
    pub fn to_hosts(&self) -> BTreeSet<IpAddr> {
        let mut hosts = BTreeSet::new();
        self.collect_into(&mut hosts);
        hosts
    }

    /// Number of addresses the target names, counting overlaps twice.
    /// Cheap to compute, so callers can refuse huge targets before
    /// expanding them.
    pub fn host_count(&self) -> usize {
        match self {
            SweepTarget::Host { .. } => 1,
            SweepTarget::Range { ipv4_range } => ipv4_range.len(),
            SweepTarget::Multi { targets } => targets
                .iter()
                .map(SweepTarget::host_count)
                .fold(0, usize::saturating_add),
        }
    }

    fn collect_into(&self, hosts: &mut BTreeSet<IpAddr>) {
        match self {
            SweepTarget::Host { addr } => {
                hosts.insert(*addr);
            }
            SweepTarget::Range { ipv4_range } => hosts.extend(ipv4_range.to_iter()),
            SweepTarget::Multi { targets } => {
                for target in targets {
                    target.collect_into(hosts);
                }
            }
        }
    }
}

impl FromStr for SweepTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.contains(',') {
            return parse_commas(s);
        }

        if let Ok(addr) = s.parse::<IpAddr>() {
            return Ok(SweepTarget::Host { addr });
        }

        if let Some(target) = parse_ip_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_cidr(s)? {
            return Ok(target);
        }

        Err(format!("invalid sweep target: {s}"))
    }
}

fn parse_commas(s: &str) -> Result<SweepTarget, String> {
    let targets = s
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(SweepTarget::from_str)
        .collect::<Result<Vec<_>, _>>()?;

    if targets.is_empty() {
        return Err(format!("no targets in list: {s}"));
    }
    Ok(SweepTarget::Multi { targets })
}

fn parse_ip_range(s: &str) -> Result<Option<SweepTarget>, String> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    let start_addr = start_str
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|e| format!("invalid start address '{start_str}': {e}"))?;
    let end_addr = parse_range_end(end_str.trim(), start_addr)?;

    Ok(Some(SweepTarget::Range {
        ipv4_range: Ipv4Range::new(start_addr, end_addr),
    }))
}

/// Completes an abbreviated range end from the start address, so
/// `10.0.1.5-2.9` means `10.0.2.9`.
fn parse_range_end(end_str: &str, start_addr: Ipv4Addr) -> Result<Ipv4Addr, String> {
    if let Ok(full) = end_str.parse::<Ipv4Addr>() {
        return Ok(full);
    }

    let partial = end_str
        .split('.')
        .map(str::parse::<u8>)
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| format!("invalid range end '{end_str}': {e}"))?;

    if partial.is_empty() || partial.len() > 4 {
        return Err(format!("invalid range end '{end_str}'"));
    }

    let mut octets = start_addr.octets();
    octets[4 - partial.len()..].copy_from_slice(&partial);
    Ok(Ipv4Addr::from(octets))
}

fn parse_cidr(s: &str) -> Result<Option<SweepTarget>, String> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let ip = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|e| format!("invalid CIDR address '{ip_str}': {e}"))?;
    let prefix = prefix_str
        .parse::<u8>()
        .map_err(|e| format!("invalid CIDR prefix '{prefix_str}': {e}"))?;
    let ipv4_range = range::cidr_range(ip, prefix).map_err(|e| e.to_string())?;

    Ok(Some(SweepTarget::Range { ipv4_range }))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviated_range_end_borrows_from_start() {
        let start = Ipv4Addr::new(192, 168, 1, 10);
        assert_eq!(parse_range_end("50", start), Ok(Ipv4Addr::new(192, 168, 1, 50)));
        assert_eq!(parse_range_end("2.66", start), Ok(Ipv4Addr::new(192, 168, 2, 66)));
        assert_eq!(
            parse_range_end("10.20.30.40", start),
            Ok(Ipv4Addr::new(10, 20, 30, 40))
        );
        assert!(parse_range_end("2.256", start).is_err());
        assert!(parse_range_end("1.2.3.4.5", start).is_err());
        assert!(parse_range_end("", start).is_err());
    }

    #[test]
    fn parses_every_supported_form() {
        assert!(matches!(
            SweepTarget::from_str("10.0.0.1"),
            Ok(SweepTarget::Host { .. })
        ));
        assert!(matches!(
            SweepTarget::from_str("::1"),
            Ok(SweepTarget::Host { .. })
        ));
        assert!(matches!(
            SweepTarget::from_str("10.0.0.1-20"),
            Ok(SweepTarget::Range { .. })
        ));
        assert!(matches!(
            SweepTarget::from_str("10.0.0.0/30"),
            Ok(SweepTarget::Range { .. })
        ));
        assert!(matches!(
            SweepTarget::from_str("10.0.0.1, 10.0.0.5-6"),
            Ok(SweepTarget::Multi { .. })
        ));

        assert!(SweepTarget::from_str("scope").is_err());
        assert!(SweepTarget::from_str("10.0.0.0/40").is_err());
        assert!(SweepTarget::from_str(" , ").is_err());
    }

    #[test]
    fn host_count_does_not_expand() {
        assert_eq!(SweepTarget::from_str("10.0.0.1").unwrap().host_count(), 1);
        assert_eq!(SweepTarget::from_str("10.0.0.0/8").unwrap().host_count(), 16_777_214);
        assert_eq!(
            SweepTarget::from_str("10.0.0.3, 10.0.0.1-3").unwrap().host_count(),
            4
        );
    }

    #[test]
    fn hosts_are_deduplicated_and_sorted() {
        let target = SweepTarget::from_str("10.0.0.3, 10.0.0.1-3").unwrap();
        let hosts: Vec<IpAddr> = target.to_hosts().into_iter().collect();
        assert_eq!(
            hosts,
            vec![
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3)),
            ]
        );
    }
}
