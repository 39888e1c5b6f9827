//! # Discovered Devices
//!
//! [`DeviceInfo`] is the unit of a discovery result. Its display name is
//! derived from a [`ProbeOutcome`], so every entry in a scan carries a usable
//! label even when the instrument never answered.

use std::fmt;

use crate::network::address::DeviceAddress;

/// The result of a best-effort identity probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The instrument answered `*IDN?` with a usable model field.
    Identified { model: String, host: String },
    /// The address was reachable in principle but identification failed.
    Unidentified { host: String, reason: String },
    /// No probe was attempted (opaque resource).
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub address: DeviceAddress,
    pub display_name: String,
    pub outcome: ProbeOutcome,
}

impl DeviceInfo {
    pub fn new(address: DeviceAddress, outcome: ProbeOutcome) -> Self {
        let display_name = match &outcome {
            ProbeOutcome::Identified { model, host } => format!("{model} ({host})"),
            ProbeOutcome::Unidentified { host, .. } => format!("Unknown Device ({host})"),
            ProbeOutcome::Skipped => address.raw().to_string(),
        };

        Self {
            address,
            display_name,
            outcome,
        }
    }

    /// An entry labelled with its raw resource string.
    pub fn unprobed(address: DeviceAddress) -> Self {
        Self::new(address, ProbeOutcome::Skipped)
    }

    pub fn is_identified(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Identified { .. })
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
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
    fn display_name_follows_outcome() {
        let addr = DeviceAddress::parse("TCPIP::10.0.0.9::INSTR", 5555);

        let identified = DeviceInfo::new(
            addr.clone(),
            ProbeOutcome::Identified {
                model: "DS1104Z".into(),
                host: "10.0.0.9".into(),
            },
        );
        assert_eq!(identified.display_name, "DS1104Z (10.0.0.9)");
        assert!(identified.is_identified());

        let unknown = DeviceInfo::new(
            addr.clone(),
            ProbeOutcome::Unidentified {
                host: "10.0.0.9".into(),
                reason: "timed out".into(),
            },
        );
        assert_eq!(unknown.display_name, "Unknown Device (10.0.0.9)");

        let skipped = DeviceInfo::unprobed(addr);
        assert_eq!(skipped.display_name, "TCPIP::10.0.0.9::INSTR");
    }
}
