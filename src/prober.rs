use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Timeouts and limits for a single banner-grab attempt.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Maximum time to wait for the TCP handshake.
    pub connect_timeout: Duration,
    /// Pause after connecting so a banner-emitting service can speak first.
    pub grace: Duration,
    /// Maximum time to wait for the first chunk of banner data.
    pub read_timeout: Duration,
    /// Upper bound on how many banner bytes to read.
    pub max_banner_bytes: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            grace: Duration::from_millis(500),
            read_timeout: Duration::from_secs(3),
            max_banner_bytes: 1024,
        }
    }
}

impl ProbeConfig {
    pub fn with_connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }

    pub fn with_grace(mut self, d: Duration) -> Self {
        self.grace = d;
        self
    }

    pub fn with_read_timeout(mut self, d: Duration) -> Self {
        self.read_timeout = d;
        self
    }
}

/// What actually happened during a probe. Collapsed to a plain string at
/// the public boundary; kept distinct here so failures stay diagnosable in
/// the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ProbeOutcome {
    Banner(String),
    NoData,
    ConnectFailed,
    ReadTimedOut,
}

/// Attempt a passive banner grab against one address and port.
///
/// Never fails from the caller's point of view: refused or timed-out
/// connects, read timeouts and undecodable bytes all collapse to an empty
/// string. The socket is dropped on every exit path.
pub async fn probe(ip: IpAddr, port: u16, cfg: &ProbeConfig) -> String {
    match probe_outcome(ip, port, cfg).await {
        ProbeOutcome::Banner(text) => text,
        outcome => {
            trace!(%ip, port, ?outcome, "probe returned no banner");
            String::new()
        }
    }
}

async fn probe_outcome(ip: IpAddr, port: u16, cfg: &ProbeConfig) -> ProbeOutcome {
    let addr = SocketAddr::new(ip, port);
    let mut stream = match timeout(cfg.connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => {
            trace!(%addr, error = %e, "connect failed");
            return ProbeOutcome::ConnectFailed;
        }
        Err(_) => {
            trace!(%addr, "connect timed out");
            return ProbeOutcome::ConnectFailed;
        }
    };

    // Give line-oriented services (SSH, SMTP, FTP) a moment to talk first.
    tokio::time::sleep(cfg.grace).await;

    let mut buf = vec![0u8; cfg.max_banner_bytes];
    match timeout(cfg.read_timeout, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {
            buf.truncate(n);
            let text = String::from_utf8_lossy(&buf).trim().to_string();
            debug!(%addr, bytes = n, "captured banner");
            if text.is_empty() {
                ProbeOutcome::NoData
            } else {
                ProbeOutcome::Banner(text)
            }
        }
        // Orderly close before any data arrived.
        Ok(Ok(_)) => ProbeOutcome::NoData,
        Ok(Err(e)) => {
            trace!(%addr, error = %e, "banner read failed");
            ProbeOutcome::NoData
        }
        // A silent service is the common case, same as zero bytes.
        Err(_) => ProbeOutcome::ReadTimedOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let cfg = ProbeConfig::default();
        assert_eq!(cfg.grace, Duration::from_millis(500));
        assert_eq!(cfg.read_timeout, Duration::from_secs(3));
        assert_eq!(cfg.max_banner_bytes, 1024);
    }

    #[test]
    fn builder_setters_override_defaults() {
        let cfg = ProbeConfig::default()
            .with_connect_timeout(Duration::from_millis(100))
            .with_grace(Duration::from_millis(10))
            .with_read_timeout(Duration::from_millis(200));
        assert_eq!(cfg.connect_timeout, Duration::from_millis(100));
        assert_eq!(cfg.grace, Duration::from_millis(10));
        assert_eq!(cfg.read_timeout, Duration::from_millis(200));
    }
}
