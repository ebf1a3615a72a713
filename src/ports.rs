use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Parse a ports file content into a deduplicated list of TCP ports (1..=65535).
///
/// Supported formats per line:
/// - single port number: `80`
/// - inclusive range: `8000-8010`
/// - comments: everything after `#` is ignored
/// - whitespace and blank lines are ignored
pub fn parse_ports_str(s: &str) -> Result<Vec<u16>> {
    let mut out: Vec<u16> = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for (idx, raw_line) in s.lines().enumerate() {
        let line_no = idx + 1;
        // Strip comments and trim
        let line = raw_line.split('#').next().map(str::trim).unwrap_or("");
        if line.is_empty() {
            continue;
        }

        // Range `start-end`
        if let Some((a, b)) = line.split_once('-') {
            let start = parse_port_str(a.trim())
                .with_context(|| format!("line {line_no}: invalid start in range: {a}"))?;
            let end = parse_port_str(b.trim())
                .with_context(|| format!("line {line_no}: invalid end in range: {b}"))?;
            if start > end {
                bail!("line {line_no}: invalid range {start}-{end} (start > end)");
            }
            for p in start..=end {
                if seen.insert(p) {
                    out.push(p);
                }
            }
            continue;
        }

        // Single number
        let p = parse_port_str(line)
            .with_context(|| format!("line {line_no}: invalid port value: {line}"))?;
        if seen.insert(p) {
            out.push(p);
        }
    }

    Ok(out)
}

/// Load a ports list from a file path. Errors if the file cannot be read or parsed.
pub fn load_ports_from_path(path: impl AsRef<Path>) -> Result<Vec<u16>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read ports file: {}", path.as_ref().display()))?;
    parse_ports_str(&content)
}

/// Reject a caller-supplied port list containing values outside 1..=65535.
///
/// This is the pre-flight check that runs before any network activity; a
/// failure here is the only error class a scan invocation surfaces.
/// Duplicates are deliberately allowed.
pub fn validate_ports(ports: &[u16]) -> Result<()> {
    for &p in ports {
        if p == 0 {
            bail!("port out of range: 0");
        }
    }
    Ok(())
}

/// Default ports probed when the caller supplies none.
pub fn default_ports() -> Vec<u16> {
    vec![80, 443]
}

fn parse_port_str(s: &str) -> Result<u16> {
    let val: u32 = s.parse::<u32>().map_err(|e| anyhow::anyhow!(e))?;
    if val == 0 || val > 65535 {
        bail!("port out of range: {val}");
    }
    Ok(val as u16)
}
