use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Banner text captured from one address:port probe. Empty when the service
/// stayed silent, the connection failed, or the read timed out.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BannerEntry {
    pub banner: String,
}

/// Per-address probe results keyed by port. Port keys are strings in the
/// persisted format, so they are strings here too.
pub type PortMap = BTreeMap<String, BannerEntry>;

/// Complete result of one scan invocation, the shape consumed by the
/// downstream rule/report generator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub target: String,
    /// Seconds since the Unix epoch, captured once at scan start.
    pub timestamp: i64,
    pub ips: Vec<IpAddr>,
    /// address -> port -> banner. Every resolved address has a key here and
    /// every requested port an entry under it, whether anything answered or
    /// not.
    pub ports: BTreeMap<String, PortMap>,
}
