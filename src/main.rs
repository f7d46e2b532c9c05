//! CLI entry point for leave_now.
//!
//! Polls GTFS-realtime feeds for one stop and keeps a one-line display of when
//! to leave (or when the next trains arrive) up to date.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use leave_now::aggregator::merge_arrivals;
use leave_now::arrivals::{Arrival, StopId, filter_stop};
use leave_now::config::FeedArgs;
use leave_now::display::{self, ConsolePresenter, run_presenter};
use leave_now::fetch::{BasicClient, fetch_bytes};
use leave_now::parser::decode_trip_updates;
use leave_now::poller;
use leave_now::status::{LogSink, Status, StatusSink};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "leave_now")]
#[command(about = "Tells you when to leave for the next train", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feeds forever and keep the display up to date
    Run {
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Fetch all feeds once and print the upcoming arrivals
    Once {
        #[command(flatten)]
        feed: FeedArgs,

        /// Print arrivals as JSON
        #[arg(long)]
        json: bool,

        /// Keep arrivals that are already in the past
        #[arg(long)]
        include_past: bool,
    },
    /// List arrivals at a stop from a saved feed file or a URL (no retries)
    Inspect {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Stop to list arrivals for
        #[arg(long, env = "MTA_STOP_ID")]
        stop_id: String,

        /// Print arrivals as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_logging()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { feed } => run(feed).await?,
        Commands::Once {
            feed,
            json,
            include_past,
        } => {
            let aggregator = feed.aggregator(Arc::new(LogSink))?;
            let arrivals = aggregator.fetch_station_trains(!include_past).await?;
            print_arrivals(&arrivals, json)?;
        }
        Commands::Inspect {
            source,
            stop_id,
            json,
        } => {
            let bytes = fetcher(&source).await?;
            let trips = decode_trip_updates(&bytes)?;
            let arrivals = merge_arrivals(vec![filter_stop(&trips, &StopId::from(stop_id))]);

            info!(trip_updates = trips.len(), arrivals = arrivals.len(), "Feed inspected");
            print_arrivals(&arrivals, json)?;
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/leave_now.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("leave_now.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

/// Starts the presenter task and polls until the process is stopped.
async fn run(feed: FeedArgs) -> Result<()> {
    let (display, rx) = display::channel();
    let display = Arc::new(display);
    display.publish(Status::Starting);

    let aggregator = feed.aggregator(display.clone())?;

    tokio::spawn(run_presenter(rx, ConsolePresenter::new(std::io::stdout())));

    poller::run(aggregator, feed.formatter(), display.as_ref(), feed.refresh()).await;
    Ok(())
}

/// Loads feed data from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %url))]
async fn fetcher(url: &str) -> Result<Vec<u8>> {
    let bytes = if url.starts_with("http") {
        let client = BasicClient::with_timeout(Duration::from_secs(30))?;
        fetch_bytes(&client, url.parse()?).await?.to_vec()
    } else {
        std::fs::read(url)?
    };
    Ok(bytes)
}

fn print_arrivals(arrivals: &[Arrival], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(arrivals)?);
        return Ok(());
    }

    if arrivals.is_empty() {
        println!("{}", Status::NoTrains);
        return Ok(());
    }

    let now = Utc::now().timestamp();
    for arrival in arrivals {
        let at = DateTime::from_timestamp(arrival.time, 0)
            .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| arrival.time.to_string());
        let minutes = arrival.time.saturating_sub(now) as f64 / 60.0;
        println!("{at}  {minutes:>6.1} min  ({})", arrival.route);
    }
    Ok(())
}
