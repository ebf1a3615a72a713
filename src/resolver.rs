use std::collections::HashSet;
use std::net::IpAddr;

use tokio::net::lookup_host;
use tracing::debug;

/// Resolve a hostname to its distinct IPv4 and IPv6 addresses.
///
/// Lookup failure (NXDOMAIN, resolver error, malformed name) is a normal
/// outcome here, not an error: the target simply has no scannable addresses
/// and an empty list is returned. Addresses appearing under multiple record
/// types are deduplicated, and the result is sorted for stable output.
pub async fn resolve(host: &str) -> Vec<IpAddr> {
    let mut set = HashSet::new();
    match lookup_host((host, 0u16)).await {
        Ok(addrs) => {
            for sock in addrs {
                set.insert(sock.ip());
            }
        }
        Err(e) => {
            debug!(host, error = %e, "hostname resolution failed");
        }
    }
    let mut ips: Vec<IpAddr> = set.into_iter().collect();
    ips.sort();
    ips
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[tokio::test]
    async fn literal_ipv4_resolves_to_itself() {
        let ips = resolve("127.0.0.1").await;
        assert_eq!(ips, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
    }

    #[tokio::test]
    async fn unresolvable_name_yields_empty_set() {
        // RFC 2606 reserves .invalid; this never resolves.
        let ips = resolve("no-such-host.invalid").await;
        assert!(ips.is_empty());
    }
}
