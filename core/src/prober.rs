//! # Device Prober
//!
//! Turns a resource identifier into a [`DeviceInfo`] with a friendly name.
//! Probing is best-effort: every failure becomes a fallback label and a
//! `warn!`, never an error, so one dead instrument cannot abort a scan.

use scopr_common::config::{Config, SessionTimeouts};
use scopr_common::device::{DeviceInfo, ProbeOutcome};
use scopr_common::error::ScoprError;
use scopr_common::network::address::{DeviceAddress, Endpoint};
use scopr_protocols::scpi::{self, Identity};
use tracing::{debug, warn};

use crate::session::{ScpiSession, SessionConfig};

#[derive(Debug, Clone)]
pub struct DeviceProber {
    timeouts: SessionTimeouts,
}

impl DeviceProber {
    pub fn new(config: &Config) -> Self {
        Self {
            timeouts: config.probe,
        }
    }

    pub fn with_timeouts(timeouts: SessionTimeouts) -> Self {
        Self { timeouts }
    }

    pub async fn probe(&self, address: DeviceAddress) -> DeviceInfo {
        let Some(endpoint) = address.endpoint().cloned() else {
            debug!("skipping probe of non-network resource {address}");
            return DeviceInfo::unprobed(address);
        };

        let outcome = match self.query_identity(&endpoint).await {
            Ok(identity) => ProbeOutcome::Identified {
                model: identity.model,
                host: endpoint.host,
            },
            Err(e) => {
                warn!("IDN probe failed for {address}: {e}");
                ProbeOutcome::Unidentified {
                    host: endpoint.host,
                    reason: e.to_string(),
                }
            }
        };

        DeviceInfo::new(address, outcome)
    }

    async fn query_identity(&self, endpoint: &Endpoint) -> Result<Identity, ScoprError> {
        let config = SessionConfig::new(endpoint.clone(), self.timeouts);
        let mut session = ScpiSession::open(&config).await?;

        let result = self.exchange(&mut session).await;
        session.close().await;
        result
    }

    async fn exchange(&self, session: &mut ScpiSession) -> Result<Identity, ScoprError> {
        session.send_line(scpi::IDN_QUERY).await?;
        let reply = session.read_text(self.timeouts.read()).await?;

        if reply.is_empty() {
            return Err(ScoprError::protocol(session.endpoint(), "no identity reply"));
        }

        Identity::parse(&reply).ok_or_else(|| {
            ScoprError::protocol(session.endpoint(), format!("malformed identity reply {reply:?}"))
        })
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
