use crate::ports;
use crate::prober::{self, ProbeConfig};
use crate::resolver;
use crate::types::{BannerEntry, PortMap, ScanReport};

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use ::time::OffsetDateTime;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Knobs for one scan invocation.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Ports to probe on every resolved address, in caller order.
    /// Duplicates are allowed and probed again; the keyed result map holds
    /// one entry per (address, port).
    pub ports: Vec<u16>,
    /// Max concurrent in-flight probe attempts.
    pub concurrency: usize,
    /// Per-probe timeouts and limits.
    pub probe: ProbeConfig,
    /// Optional wall-clock bound for the whole scan. Probes still pending
    /// at the deadline are cancelled and report empty banners.
    pub deadline: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ports: ports::default_ports(),
            concurrency: 64,
            probe: ProbeConfig::default(),
            deadline: None,
        }
    }
}

/// Resolve `host` and banner-probe every (address, port) pair concurrently.
///
/// - Limits concurrent socket attempts using a `Semaphore`.
/// - Per-probe failures never abort the scan; they surface as empty banners.
/// - The returned report is always complete: every resolved address keys the
///   ports map and every requested port has exactly one entry under it.
pub async fn scan_host(host: &str, cfg: &ScanConfig) -> ScanReport {
    scan_host_with_cancel(host, cfg, CancellationToken::new()).await
}

/// Variant that accepts a `CancellationToken` for external cancellation
/// (Ctrl-C, a caller-imposed timeout). A cancelled scan still returns a
/// complete, well-formed report; unfinished probes surface as empty banners.
pub async fn scan_host_with_cancel(
    host: &str,
    cfg: &ScanConfig,
    cancel: CancellationToken,
) -> ScanReport {
    let timestamp = OffsetDateTime::now_utc().unix_timestamp();
    let ips = resolver::resolve(host).await;
    debug!(
        host,
        addresses = ips.len(),
        ports = cfg.ports.len(),
        "starting scan"
    );

    // Seed an entry for the full address x port cross-product up front, so
    // the exactly-one-entry invariant holds no matter how probes end.
    let mut ports_map: BTreeMap<String, PortMap> = BTreeMap::new();
    for ip in &ips {
        let per_addr = ports_map.entry(ip.to_string()).or_default();
        for port in &cfg.ports {
            per_addr.insert(port.to_string(), BannerEntry::default());
        }
    }

    if let Some(deadline) = cfg.deadline {
        let cancel_deadline = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            cancel_deadline.cancel();
        });
    }

    let sem = Arc::new(Semaphore::new(cfg.concurrency.clamp(1, 5_000)));
    let mut set: JoinSet<(IpAddr, u16, String)> = JoinSet::new();

    for &ip in &ips {
        if cancel.is_cancelled() {
            break;
        }
        for &port in &cfg.ports {
            if cancel.is_cancelled() {
                warn!("scan cancelled before all probes were launched");
                break;
            }
            let permit = sem
                .clone()
                .acquire_owned()
                .await
                .expect("semaphore in scope");
            let probe_cfg = cfg.probe.clone();
            let cancel = cancel.clone();

            set.spawn(async move {
                let _permit = permit; // keep permit until the probe finishes

                let banner = tokio::select! {
                    banner = prober::probe(ip, port, &probe_cfg) => banner,
                    // Dropping the probe future releases its socket.
                    _ = cancel.cancelled() => String::new(),
                };
                (ip, port, banner)
            });
        }
    }

    // Collect-then-merge: completion order is irrelevant, the map is keyed.
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((ip, port, banner)) => {
                trace!(%ip, port, empty = banner.is_empty(), "probe finished");
                if let Some(per_addr) = ports_map.get_mut(&ip.to_string()) {
                    per_addr.insert(port.to_string(), BannerEntry { banner });
                }
            }
            Err(e) => warn!(error = %e, "probe task failed to join"),
        }
    }

    ScanReport {
        target: host.to_string(),
        timestamp,
        ips,
        ports: ports_map,
    }
}
