use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use syncpulse::connection::EndpointConnector;
use syncpulse::data::export::default_file_name;
use syncpulse::{Dashboard, DashboardEvent, ExportError, Metric, Settings, SimulatedConnector};

#[derive(Parser, Debug)]
#[command(name = "syncpulse")]
#[command(about = "Live sensor telemetry client: stream readings, classify them, export history")]
struct Args {
    /// Endpoint to connect to (ws://, wss://, tcp://host:port, sim://)
    #[arg(short, long, conflicts_with = "simulate")]
    connect: Option<String>,

    /// Use the built-in simulated sensor feed
    #[arg(short, long)]
    simulate: bool,

    /// Settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Points kept per metric
    #[arg(long)]
    capacity: Option<usize>,

    /// Stop after this many accepted readings
    #[arg(short, long)]
    limit: Option<usize>,

    /// Send one message once the connection is open
    #[arg(long)]
    send: Option<String>,

    /// Write the recorded history as CSV on exit (a directory gets a
    /// timestamped file name)
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(capacity) = args.capacity {
        settings.capacity = capacity;
        settings.validate().context("Invalid --capacity")?;
    }
    if let Some(ref endpoint) = args.connect {
        settings.endpoint = Some(endpoint.clone());
    } else if args.simulate {
        settings.endpoint = Some("sim://".to_string());
    }

    // Single-threaded: every event is applied in order on this thread
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(&args, &settings))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "syncpulse=debug" } else { "syncpulse=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: &Args, settings: &Settings) -> Result<()> {
    let connector = EndpointConnector::new(SimulatedConnector::new(settings.simulate_interval()));
    let mut dashboard = Dashboard::new(Box::new(connector), settings);

    dashboard
        .connect(None)
        .context("Failed to connect (pass --connect or --simulate, or set SYNCPULSE_ENDPOINT)")?;

    let mut pending = args.send.clone();
    let mut accepted = 0usize;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let event = tokio::select! {
            event = dashboard.next_event() => event,
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        };
        let Some(event) = event else { break };

        match &event {
            DashboardEvent::Status(status) => {
                println!("{}", event);
                if !status.connected {
                    break;
                }
                if let Some(payload) = pending.take() {
                    if let Err(e) = dashboard.send_message(&payload) {
                        error!("Failed to send message: {}", e);
                    }
                }
            }
            DashboardEvent::Reading { reading, status } => {
                for metric in Metric::ALL {
                    let metric_status = status.get(metric);
                    info!(
                        metric = metric.snake_name(),
                        value = reading.value(metric),
                        status = metric_status.classification.symbol(),
                        trend = ?metric_status.trend,
                        "Reading"
                    );
                }
                println!("{}", event);

                accepted += 1;
                if args.limit.is_some_and(|limit| accepted >= limit) {
                    info!("Received {} readings, stopping", accepted);
                    break;
                }
            }
            DashboardEvent::Rejected(_) => {}
        }
    }

    dashboard.disconnect();

    if let Some(ref path) = args.export {
        let path = export_path(path);
        match dashboard.export_to_file(&path) {
            Ok(()) => info!("Exported history to {}", path.display()),
            Err(ExportError::NoData) => warn!("No readings received, nothing exported"),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to export to {}", path.display()))
            }
        }
    }

    Ok(())
}

fn export_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(default_file_name(chrono::Utc::now()))
    } else {
        path.to_path_buf()
    }
}
