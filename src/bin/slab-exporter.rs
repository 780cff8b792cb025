//! slab-exporter - Prometheus exporter for `/proc/slabinfo`.
//!
//! Serves one gauge family per slabinfo column on `/metrics`, labeled by
//! slab pool name. Every scrape re-reads slabinfo.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use slab_exporter::collector::{FileSystem, RealFs, SlabCollector};
use slab_exporter::config::{EventsConfig, ExporterConfig};
use slab_exporter::{exposition, server};

/// Prometheus exporter for Linux slab allocator statistics.
#[derive(Parser)]
#[command(name = "slab-exporter", about = "Prometheus exporter for /proc/slabinfo", version)]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long, env = "SLAB_EXPORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (default: 0.0.0.0:9555).
    #[arg(long, env = "SLAB_EXPORTER_LISTEN")]
    listen: Option<String>,

    /// Path to slabinfo (default: /proc/slabinfo).
    #[arg(long, value_name = "PATH")]
    slabinfo_path: Option<PathBuf>,

    /// Only export rows matching this regular expression.
    /// Overrides `events.regex` from the config file.
    #[arg(long, env = "SLAB_EXPORTER_REGEX")]
    regex: Option<String>,

    /// Print one scrape to stdout and exit.
    #[arg(long)]
    once: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    /// Settings given on the command line, to be layered over the file.
    fn overrides(&self) -> ExporterConfig {
        ExporterConfig {
            slabinfo_path: self.slabinfo_path.clone(),
            listen: self.listen.clone(),
            events: EventsConfig {
                regex: self.regex.clone(),
            },
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
/// `RUST_LOG`, when set, replaces the level chosen by the flags.
fn init_logging(verbose: u8, quiet: bool) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, quiet, env.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn log_filter(verbose: u8, quiet: bool, env: Option<&str>) -> EnvFilter {
    if let Some(directives) = env.filter(|d| !d.is_empty()) {
        return EnvFilter::new(directives);
    }

    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    EnvFilter::new(format!("error,slab_exporter={}", level))
}

fn load_config(args: &Args, fs: &RealFs) -> ExporterConfig {
    let file_config = match args.config {
        Some(ref path) => match ExporterConfig::load(fs, path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        },
        None => ExporterConfig::default(),
    };
    file_config.merge(args.overrides())
}

fn run_once(collector: &SlabCollector<RealFs>) {
    let snapshot = collector.collect();
    match exposition::render(&snapshot.measurements) {
        Ok(text) => print!("{}", text),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            process::exit(1);
        }
    }
    if !snapshot.errors.is_empty() {
        warn!(errors = snapshot.errors.len(), "scrape finished with errors");
    }
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let fs = RealFs::new();
    let config = load_config(&args, &fs);

    let collector = match config.build_collector(fs) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    if args.once {
        run_once(&collector);
        return;
    }

    let addr = match config.listen_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    info!("slab-exporter {} starting", slab_exporter::VERSION);
    info!(
        "Config: slabinfo={}, filter={}",
        collector.path().display(),
        collector.filter().pattern().unwrap_or("<none>")
    );
    if !fs.exists(collector.path()) {
        warn!(
            path = %collector.path().display(),
            "slabinfo not found, scrapes will be empty until it appears"
        );
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(server::serve(Arc::new(collector), addr)) {
        error!(%addr, error = %e, "server error");
        process::exit(1);
    }
}
