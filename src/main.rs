use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use ::time::{format_description::well_known, OffsetDateTime};

use recon_scan_rs::prober::ProbeConfig;
use recon_scan_rs::scanner::{self, ScanConfig};
use recon_scan_rs::types::ScanReport;
use recon_scan_rs::{output, ports};

/// recon-scan-rs — Lightweight async recon scanner: DNS resolution plus concurrent TCP banner grabbing.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "recon-scan-rs",
    version,
    about = "Lightweight async recon scanner: DNS resolution plus concurrent TCP banner grabbing.",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Resolve a target, banner-probe its ports, and write a JSON report.
    Scan(ScanArgs),
}

#[derive(Debug, Clone, Args)]
struct ScanArgs {
    /// Domain or IP to scan.
    target: String,

    /// Ports to banner-probe (default: 80 443).
    #[arg(long, num_args = 1..)]
    ports: Option<Vec<u16>>,

    /// Path to a ports list file (one port or range per line) instead of --ports.
    #[arg(long, conflicts_with = "ports")]
    ports_file: Option<PathBuf>,

    /// Write the JSON report here (default: scan_<target>.json).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Max concurrent probe attempts.
    #[arg(long, default_value_t = 64)]
    concurrency: usize,

    /// Socket connect timeout in milliseconds.
    #[arg(long = "connect-timeout-ms", default_value_t = 3000)]
    connect_timeout_ms: u64,

    /// Pause after connecting before the banner read, in milliseconds.
    #[arg(long = "grace-ms", default_value_t = 500)]
    grace_ms: u64,

    /// Banner read timeout in milliseconds.
    #[arg(long = "read-timeout-ms", default_value_t = 3000)]
    read_timeout_ms: u64,

    /// Optional wall-clock bound for the whole scan, in milliseconds.
    #[arg(long = "deadline-ms")]
    deadline_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Scan(args) => run_scan(args).await,
    }
}

async fn run_scan(args: ScanArgs) -> Result<()> {
    // Pre-flight validation: the only error class surfaced to the caller,
    // raised before any network activity.
    let scan_ports = match &args.ports_file {
        Some(path) => ports::load_ports_from_path(path)?,
        None => args.ports.clone().unwrap_or_else(ports::default_ports),
    };
    ports::validate_ports(&scan_ports)?;
    if scan_ports.is_empty() {
        bail!("no ports to scan");
    }

    let cfg = ScanConfig {
        ports: scan_ports,
        concurrency: args.concurrency,
        probe: ProbeConfig::default()
            .with_connect_timeout(Duration::from_millis(args.connect_timeout_ms))
            .with_grace(Duration::from_millis(args.grace_ms))
            .with_read_timeout(Duration::from_millis(args.read_timeout_ms)),
        deadline: args.deadline_ms.map(Duration::from_millis),
    };

    println!("recon-scan-rs configuration:");
    println!("  target       : {}", args.target);
    println!("  ports        : {}", describe_ports(&cfg.ports));
    println!("  concurrency  : {}", cfg.concurrency);
    println!(
        "  timeouts     : connect {}ms, grace {}ms, read {}ms",
        args.connect_timeout_ms, args.grace_ms, args.read_timeout_ms
    );
    println!(
        "  deadline     : {}",
        args.deadline_ms
            .map(|ms| format!("{ms}ms"))
            .unwrap_or_else(|| "<none>".to_string())
    );
    println!("  started      : {}", now_rfc3339());

    // Ctrl-C cancels outstanding probes; the scan still returns a complete
    // report with empty banners for whatever was cut short.
    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        cancel_ctrlc.cancel();
    });

    let report = scanner::scan_host_with_cancel(&args.target, &cfg, cancel).await;
    print_banner_table(&report);

    let path = args
        .output
        .unwrap_or_else(|| output::default_output_path(&args.target));
    output::write_scan_json(&path, &report)?;
    println!("Wrote scan report to {}", path.display());

    Ok(())
}

fn describe_ports(ports: &[u16]) -> String {
    if ports.len() <= 12 {
        ports
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        format!("{} ports", ports.len())
    }
}

fn print_banner_table(report: &ScanReport) {
    let mut rows: Vec<(&str, &str, String)> = Vec::new();
    for (ip, per_addr) in &report.ports {
        for (port, entry) in per_addr {
            if entry.banner.is_empty() {
                continue;
            }
            let flat = entry.banner.replace('\n', "\\n").replace('\r', "\\r");
            let snippet: String = flat.chars().take(60).collect();
            rows.push((ip.as_str(), port.as_str(), snippet));
        }
    }

    println!(
        "\nAddresses: {}  Banners captured: {}",
        report.ips.len(),
        rows.len()
    );
    if rows.is_empty() {
        return;
    }

    let mut ip_w = "ip".len();
    let mut port_w = "port".len();
    let mut banner_w = "banner".len();
    for (ip, port, banner) in &rows {
        ip_w = ip_w.max(ip.len());
        port_w = port_w.max(port.len());
        banner_w = banner_w.max(banner.len());
    }

    println!(
        "{:<ip_w$}  {:>port_w$}  {:<banner_w$}",
        "ip",
        "port",
        "banner",
        ip_w = ip_w,
        port_w = port_w,
        banner_w = banner_w
    );
    println!(
        "{:-<ip_w$}  {:-<port_w$}  {:-<banner_w$}",
        "",
        "",
        "",
        ip_w = ip_w,
        port_w = port_w,
        banner_w = banner_w
    );
    for (ip, port, banner) in &rows {
        println!(
            "{:<ip_w$}  {:>port_w$}  {:<banner_w$}",
            ip,
            port,
            banner,
            ip_w = ip_w,
            port_w = port_w,
            banner_w = banner_w
        );
    }
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
