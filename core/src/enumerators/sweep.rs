use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use scopr_common::config::Config;
use scopr_common::enumeration::ResourceEnumerator;
use scopr_common::network::target::SweepTarget;
use tracing::{info, warn};

use crate::network::tcp;

/// Largest sweep accepted, a full /16.
pub const MAX_SWEEP_HOSTS: usize = 1 << 16;

/// Finds instruments by attempting a TCP handshake on the instrument port of
/// every address in a [`SweepTarget`].
///
/// Every host that accepts is reported as `TCPIP::<ip>::<port>::SOCKET`.
/// Only IPv4 hosts are swept, since the resource syntax has no room for
/// IPv6 literals.
#[derive(Debug, Clone)]
pub struct TcpSweep {
    target: SweepTarget,
    port: u16,
    connect_timeout: Duration,
    concurrency: usize,
}

impl TcpSweep {
    pub fn new(target: SweepTarget, config: &Config) -> Self {
        Self {
            target,
            port: config.default_port,
            connect_timeout: config.probe.connect(),
            concurrency: config.probe_concurrency,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[async_trait]
impl ResourceEnumerator for TcpSweep {
    async fn list_resources(&self) -> anyhow::Result<Vec<String>> {
        let requested = self.target.host_count();
        anyhow::ensure!(
            requested <= MAX_SWEEP_HOSTS,
            "sweep target names {requested} addresses, the limit is {MAX_SWEEP_HOSTS}"
        );

        let (v4, v6): (Vec<IpAddr>, Vec<IpAddr>) =
            self.target.to_hosts().into_iter().partition(IpAddr::is_ipv4);

        if !v6.is_empty() {
            warn!("Skipping {} IPv6 address(es) in sweep target", v6.len());
        }
        anyhow::ensure!(!v4.is_empty(), "sweep target contains no IPv4 addresses");

        info!("Sweeping {} host(s) on port {}", v4.len(), self.port);
        let found = tcp::handshake_sweep(
            v4.into_iter().collect(),
            self.port,
            self.connect_timeout,
            self.concurrency,
        )
        .await;

        Ok(found
            .into_iter()
            .map(|ip| format!("TCPIP::{ip}::{}::SOCKET", self.port))
            .collect())
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
    use std::str::FromStr;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn listening_host_becomes_socket_resource() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let target = SweepTarget::from_str("127.0.0.1").unwrap();
        let sweep = TcpSweep::new(target, &Config::default()).with_port(port);

        assert_eq!(
            sweep.list_resources().await.unwrap(),
            vec![format!("TCPIP::127.0.0.1::{port}::SOCKET")]
        );
    }

    #[tokio::test]
    async fn oversized_target_is_rejected_before_sweeping() {
        let target = SweepTarget::from_str("10.0.0.0/8").unwrap();
        let sweep = TcpSweep::new(target, &Config::default());

        let err = sweep.list_resources().await.unwrap_err();
        assert!(err.to_string().contains("16777214"), "{err}");
    }

    #[tokio::test]
    async fn ipv6_only_target_is_rejected() {
        let target = SweepTarget::from_str("::1").unwrap();
        let sweep = TcpSweep::new(target, &Config::default());
        assert!(sweep.list_resources().await.is_err());
    }
}
