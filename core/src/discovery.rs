//! # Instrument Discovery Service
//!
//! Implements the "scan for instruments" use case.
//!
//! The service asks a [`ResourceEnumerator`] for candidate resource strings,
//! probes every network-addressable one for its identity, and returns one
//! [`DeviceInfo`] per candidate in enumeration order.

use std::sync::Arc;

use scopr_common::config::Config;
use scopr_common::device::{DeviceInfo, ProbeOutcome};
use scopr_common::enumeration::ResourceEnumerator;
use scopr_common::error::ScoprError;
use scopr_common::network::address::DeviceAddress;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::prober::DeviceProber;

type ProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Application service for instrument discovery.
///
/// Orchestrates a scan by:
/// 1. delegating candidate enumeration to the [`ResourceEnumerator`] trait.
/// 2. fanning identity probes out over at most `probe_concurrency` tasks.
/// 3. reassembling the results in input order once every probe finished.
pub struct DiscoveryService {
    enumerator: Box<dyn ResourceEnumerator>,
    prober: DeviceProber,
    default_port: u16,
    concurrency: usize,
    on_probe_done: Option<ProgressCallback>,
}

impl DiscoveryService {
    pub fn new(enumerator: Box<dyn ResourceEnumerator>, config: &Config) -> Self {
        Self {
            enumerator,
            prober: DeviceProber::new(config),
            default_port: config.default_port,
            concurrency: config.probe_concurrency.max(1),
            on_probe_done: None,
        }
    }

    /// Called with the number of finished probes each time one completes.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.on_probe_done = Some(Arc::new(callback));
        self
    }

    /// Runs one scan.
    ///
    /// Only a failing enumerator fails the call. Unreachable or confused
    /// instruments still appear in the result under a fallback name.
    pub async fn discover(&self) -> Result<Vec<DeviceInfo>, ScoprError> {
        let resources = self
            .enumerator
            .list_resources()
            .await
            .map_err(ScoprError::Discovery)?;

        let addresses: Vec<DeviceAddress> = resources
            .iter()
            .map(|resource| resource.trim())
            .filter(|resource| !resource.is_empty())
            .map(|resource| DeviceAddress::parse(resource, self.default_port))
            .collect();

        info!(
            "Found {} potential device(s). Starting IDN probe...",
            addresses.len()
        );

        let devices = self.probe_all(addresses).await;

        let identified = devices.iter().filter(|d| d.is_identified()).count();
        info!("Identified {identified} of {} device(s)", devices.len());

        Ok(devices)
    }

    async fn probe_all(&self, addresses: Vec<DeviceAddress>) -> Vec<DeviceInfo> {
        let mut slots: Vec<Option<DeviceInfo>> = vec![None; addresses.len()];
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut probes: JoinSet<(usize, DeviceInfo)> = JoinSet::new();

        for (idx, address) in addresses.iter().enumerate() {
            if !address.is_network() {
                slots[idx] = Some(DeviceInfo::unprobed(address.clone()));
                continue;
            }

            let prober = self.prober.clone();
            let permits = permits.clone();
            let address = address.clone();
            probes.spawn(async move {
                let _permit = permits.acquire_owned().await;
                (idx, prober.probe(address).await)
            });
        }

        let mut finished: usize = 0;
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((idx, device)) => slots[idx] = Some(device),
                Err(e) => warn!("probe task ended abnormally: {e}"),
            }

            finished += 1;
            if let Some(callback) = &self.on_probe_done {
                callback(finished);
            }
        }

        slots
            .into_iter()
            .zip(addresses)
            .map(|(slot, address)| slot.unwrap_or_else(|| unfinished_probe(address)))
            .collect()
    }
}

/// Entry for an address whose probe task never reported back.
fn unfinished_probe(address: DeviceAddress) -> DeviceInfo {
    let Some(host) = address.endpoint().map(|endpoint| endpoint.host.clone()) else {
        return DeviceInfo::unprobed(address);
    };

    let outcome = ProbeOutcome::Unidentified {
        host,
        reason: "probe task ended abnormally".to_string(),
    };
    DeviceInfo::new(address, outcome)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
