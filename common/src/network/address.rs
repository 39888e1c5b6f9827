//! # Device Addresses
//!
//! Instruments are located by VISA-style resource strings. Only the raw
//! socket form is network-addressable here:
//!
//! * `TCPIP::192.168.1.5::INSTR` resolves to `192.168.1.5:<default port>`.
//! * `TCPIP0::192.168.1.5::5025::SOCKET` resolves to `192.168.1.5:5025`.
//! * Anything else (`USB0::...`, `ASRL1::INSTR`, free-form tokens) is kept as
//!   an opaque resource and passed through untouched.

use std::fmt;

use crate::error::ScoprError;

const RESOURCE_SEPARATOR: &str = "::";
const TCPIP_PREFIX: &str = "tcpip";

/// A resolved `host:port` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// A resource identifier as produced by the enumeration collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAddress {
    /// A `TCPIP::` resource with a usable host.
    Network { raw: String, endpoint: Endpoint },
    /// Any resource this crate cannot reach over a raw socket.
    Opaque { raw: String },
}

impl DeviceAddress {
    /// Classifies `raw`, filling in `default_port` when the resource string
    /// names no port or a malformed one.
    pub fn parse(raw: &str, default_port: u16) -> Self {
        match parse_tcpip(raw, default_port) {
            Some(endpoint) => DeviceAddress::Network {
                raw: raw.to_string(),
                endpoint,
            },
            None => DeviceAddress::Opaque {
                raw: raw.to_string(),
            },
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            DeviceAddress::Network { raw, .. } | DeviceAddress::Opaque { raw } => raw,
        }
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        match self {
            DeviceAddress::Network { endpoint, .. } => Some(endpoint),
            DeviceAddress::Opaque { .. } => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, DeviceAddress::Network { .. })
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

/// Resolves an operator-supplied address for a direct operation.
///
/// Besides `TCPIP::` resources, a bare host token such as `192.168.1.5` or
/// `scope.lab` is accepted and paired with `default_port`. Other structured
/// resources fail without touching the network.
pub fn resolve_endpoint(raw: &str, default_port: u16) -> Result<Endpoint, ScoprError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ScoprError::address(raw, "address is empty"));
    }

    if let DeviceAddress::Network { endpoint, .. } = DeviceAddress::parse(trimmed, default_port) {
        return Ok(endpoint);
    }

    if trimmed.contains(RESOURCE_SEPARATOR) {
        return Err(ScoprError::address(
            raw,
            "only TCPIP resources can be reached over a socket",
        ));
    }

    if trimmed.chars().any(char::is_whitespace) {
        return Err(ScoprError::address(raw, "host contains whitespace"));
    }

    Ok(Endpoint::new(trimmed, default_port))
}

fn parse_tcpip(raw: &str, default_port: u16) -> Option<Endpoint> {
    let mut parts = raw.trim().split(RESOURCE_SEPARATOR);

    let interface = parts.next()?;
    if !is_tcpip_interface(interface) {
        return None;
    }

    let host = parts.next()?.trim();
    if host.is_empty() {
        return None;
    }

    let port = parts
        .next()
        .and_then(parse_port)
        .unwrap_or(default_port);

    Some(Endpoint::new(host, port))
}

/// Matches `TCPIP` and `TCPIP<board>` case-insensitively.
fn is_tcpip_interface(segment: &str) -> bool {
    let lower = segment.trim().to_ascii_lowercase();
    let Some(board) = lower.strip_prefix(TCPIP_PREFIX) else {
        return false;
    };
    board.chars().all(|c| c.is_ascii_digit())
}

fn parse_port(segment: &str) -> Option<u16> {
    let segment = segment.trim();
    if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    segment.parse::<u16>().ok().filter(|port| *port != 0)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
