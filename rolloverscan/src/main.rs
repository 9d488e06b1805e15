use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod report;
mod sweep;

use config::{Config, Overrides};
use report::OutputFormat;

/// Finds recent Tenable.io scans that skipped hosts because of an exclusion window and
/// creates a "rollover" copy of each one that targets only the missed hosts.
///
/// Run it after the exclusion window has started so the scans it examines are finished.
#[derive(Debug, Parser)]
#[command(name = "rolloverscan", version, about, long_about)]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./rolloverscan.yaml if present.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Scan to evaluate. Default: every scan in the time range. If names repeat, the last one listed wins.
    #[arg(long)]
    scanname: Option<String>,
    /// How far back to look, by scan start time. Default: 24
    #[arg(long)]
    hours: Option<u64>,
    /// Tenable.io access key
    #[arg(long, env = "TIO_ACCESS_KEY", hide_env_values = true)]
    accesskey: Option<String>,
    /// Tenable.io secret key
    #[arg(long, env = "TIO_SECRET_KEY", hide_env_values = true)]
    secretkey: Option<String>,
    /// Tenable.io host. Default: cloud.tenable.com
    #[arg(long, env = "TIO_HOST")]
    host: Option<String>,
    /// Tenable.io port. Default: 443
    #[arg(long, env = "TIO_PORT")]
    port: Option<u16>,
    /// Timeout per API request in milliseconds. Default: 30000
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Output format: text or jsonl
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// Turn on debugging
    #[arg(long, default_value_t = false)]
    debug: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            access_key: self.accesskey.clone(),
            secret_key: self.secretkey.clone(),
            host: self.host.clone(),
            port: self.port,
            timeout_ms: self.timeout_ms,
            scan_name: self.scanname.clone(),
            hours: self.hours,
            format: self.format,
        }
    }
}

fn init_tracing(debug: bool) {
    let fallback = if debug {
        "warn,rolloverscan=debug,tenable_io=debug,scan_locator=debug,scan_evaluator=debug,rollover_creator=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    tracing::debug!("debugging is enabled");

    let file = config::load_config(cli.config.as_deref())?;
    let cfg = Config::resolve(cli.overrides(), file)?;

    println!(
        "Connecting to {}:{} with access key {} to review scans from the last {} hours",
        cfg.client.host,
        cfg.client.port,
        config::mask_key(&cfg.client.access_key),
        cfg.sweep.lookback_hours
    );
    let service = tenable_io::TenableIo::open(&cfg.client).context("failed to set up Tenable.io client")?;

    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let mut out = report::for_format(cfg.format, std::io::stdout(), std::io::stderr());
    let now = OffsetDateTime::now_utc();
    let summary = rt.block_on(sweep::sweep(&service, &cfg.sweep, now, &mut *out))?;
    tracing::debug!(?summary, "sweep finished");
    Ok(())
}
