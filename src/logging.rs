use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging based on verbosity flags
///
/// `RUST_LOG` overrides the flag-derived stderr filter. The log file, when
/// given, records at info (debug with `--debug`) regardless of `--quiet`.
/// The returned guard must be held until exit so buffered lines are flushed.
pub fn init_logging(
    debug: bool,
    quiet: bool,
    log_file: Option<PathBuf>,
) -> anyhow::Result<Option<WorkerGuard>> {
    let default_filter = if debug {
        "trip_planner=debug"
    } else if quiet {
        "trip_planner=error"
    } else {
        "trip_planner=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(debug)
        .with_file(debug)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    let Some(log_path) = log_file else {
        tracing_subscriber::registry().with(fmt_layer).init();
        return Ok(None);
    };

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(if debug {
            "trip_planner=debug"
        } else {
            "trip_planner=info"
        }));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(file_layer)
        .init();

    Ok(Some(guard))
}

/// Default log file path for a session
pub fn default_log_path(command: &str) -> anyhow::Result<PathBuf> {
    let log_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("trip-planner")
        .join("logs");

    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let filename = format!("{}-{}.log", command, timestamp);

    Ok(log_dir.join(filename))
}
