//! Interface to the downstream artifact generator.
//!
//! The generator itself (detection rules, HTML report) lives outside this
//! crate next to its templates; this module defines the data it consumes:
//! structured findings, deduplicated indicator lists, and the static
//! technique-mapping table, plus the rendering seam.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::types::ScanReport;

/// Finding kinds and the technique-map keys they look up.
pub const KIND_DNS_LOOKUP: &str = "dns_lookup";
pub const KIND_BANNER: &str = "banner";
const MAP_KEY_DNS_ENUM: &str = "dns_enum";
const MAP_KEY_BANNER_GRAB: &str = "banner_grab";

/// Banner text longer than this is truncated in finding descriptions.
const MAX_BANNER_SNIPPET: usize = 200;

/// Static lookup from activity kind to detection-technique identifiers,
/// maintained as a read-only JSON file outside this crate.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct TechniqueMap(pub BTreeMap<String, Vec<String>>);

impl TechniqueMap {
    /// Techniques registered for a kind; unknown kinds map to nothing.
    pub fn techniques_for(&self, kind: &str) -> Vec<String> {
        self.0.get(kind).cloned().unwrap_or_default()
    }
}

/// Load the technique-mapping table from a JSON file.
pub fn load_technique_map(path: impl AsRef<Path>) -> Result<TechniqueMap> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read technique map: {}", path.as_ref().display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse technique map: {}", path.as_ref().display()))
}

/// One notable observation extracted from a scan report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: String,
    pub description: String,
    pub techniques: Vec<String>,
}

/// Deduplicated indicators collected from a report.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct IocSet {
    pub ips: BTreeSet<String>,
    pub banners: BTreeSet<String>,
    pub domains: BTreeSet<String>,
}

/// Convert a raw scan report into structured findings plus indicator lists.
///
/// Pure function over the report: one resolution finding per address, one
/// banner finding per non-empty banner. Tolerates an empty address list and
/// all-empty banners, yielding empty output.
pub fn map_findings(report: &ScanReport, techniques: &TechniqueMap) -> (Vec<Finding>, IocSet) {
    let mut findings = Vec::new();
    let mut iocs = IocSet::default();

    for ip in &report.ips {
        let ip = ip.to_string();
        iocs.ips.insert(ip.clone());
        findings.push(Finding {
            kind: KIND_DNS_LOOKUP.to_string(),
            description: format!("Resolved {} -> {}", report.target, ip),
            techniques: techniques.techniques_for(MAP_KEY_DNS_ENUM),
        });
    }

    for (addr, per_addr) in &report.ports {
        for (port, entry) in per_addr {
            let banner = entry.banner.trim();
            if banner.is_empty() {
                continue;
            }
            iocs.banners.insert(banner.to_string());
            let snippet: String = banner.chars().take(MAX_BANNER_SNIPPET).collect();
            findings.push(Finding {
                kind: KIND_BANNER.to_string(),
                description: format!("Banner on {addr}:{port} -> {snippet}"),
                techniques: techniques.techniques_for(MAP_KEY_BANNER_GRAB),
            });
        }
    }

    (findings, iocs)
}

/// Rendering seam for the downstream generator: a pure function from scan
/// data to artifact text (rule files, HTML reports, indicator dumps).
/// Implementations live outside this crate, next to their templates.
pub trait ArtifactRenderer {
    fn render(&self, report: &ScanReport, findings: &[Finding], iocs: &IocSet) -> String;
}
