use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use scopr_common::error::{ConnectionFailure, ScoprError};
use scopr_common::network::address::Endpoint;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::debug;

/// Opens a TCP connection, classifying failures so callers can tell a
/// refused port from a silent host.
pub async fn connect(endpoint: &Endpoint, connect_timeout: Duration) -> Result<TcpStream, ScoprError> {
    let target = (endpoint.host.as_str(), endpoint.port);

    match timeout(connect_timeout, TcpStream::connect(target)).await {
        Ok(Ok(stream)) => {
            if let Err(e) = stream.set_nodelay(true) {
                debug!("could not disable Nagle on {endpoint}: {e}");
            }
            Ok(stream)
        }
        Ok(Err(e)) => Err(ScoprError::connection(endpoint, ConnectionFailure::from_io(e))),
        Err(_elapsed) => Err(ScoprError::connection(endpoint, ConnectionFailure::Timeout)),
    }
}

/// `true` when something accepted a connection on `addr` in time.
pub async fn handshake_probe(addr: SocketAddr, probe_timeout: Duration) -> bool {
    matches!(
        timeout(probe_timeout, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}

/// Tries `port` on every host, at most `concurrency` at a time, and returns
/// the hosts that accepted, sorted.
pub async fn handshake_sweep(
    hosts: BTreeSet<IpAddr>,
    port: u16,
    probe_timeout: Duration,
    concurrency: usize,
) -> Vec<IpAddr> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut probes: JoinSet<Option<IpAddr>> = JoinSet::new();

    let mut found: Vec<IpAddr> = Vec::new();

    for ip in hosts {
        // At most `concurrency` tasks exist at once; the permit rides along.
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        probes.spawn(async move {
            let _permit = permit;
            handshake_probe(SocketAddr::new(ip, port), probe_timeout)
                .await
                .then_some(ip)
        });

        while let Some(joined) = probes.try_join_next() {
            if let Ok(Some(ip)) = joined {
                found.push(ip);
            }
        }
    }

    while let Some(joined) = probes.join_next().await {
        if let Ok(Some(ip)) = joined {
            found.push(ip);
        }
    }
    found.sort();
    found
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
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const TIMEOUT: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn connect_reports_refusal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = Endpoint::new("127.0.0.1", port);
        let err = connect(&endpoint, TIMEOUT).await.unwrap_err();
        assert!(err.is_refused(), "{err}");
        assert_eq!(err.endpoint(), Some(&endpoint));
    }

    #[tokio::test]
    async fn sweep_finds_only_listening_hosts() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut hosts = BTreeSet::new();
        hosts.insert(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let found = handshake_sweep(hosts, port, TIMEOUT, 4).await;
        assert_eq!(found, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);

        drop(listener);
        let mut hosts = BTreeSet::new();
        hosts.insert(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(handshake_sweep(hosts, port, TIMEOUT, 4).await.is_empty());
    }

    #[tokio::test]
    async fn sweep_with_single_permit_checks_every_host() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let hosts: BTreeSet<IpAddr> = (1..=6)
            .map(|last| IpAddr::V4(Ipv4Addr::new(127, 0, 0, last)))
            .collect();
        let found = handshake_sweep(hosts, port, TIMEOUT, 1).await;
        assert_eq!(found, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
    }

    #[tokio::test]
    #[ignore]
    async fn connect_times_out_on_blackholed_address() {
        let endpoint = Endpoint::new("203.0.113.1", 5555);
        let err = connect(&endpoint, Duration::from_millis(200)).await.unwrap_err();
        assert!(err.is_timeout(), "{err}");
    }
}
