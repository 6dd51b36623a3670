mod cli;
mod config;
mod generator;
mod logging;
mod planner;
mod template;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::{CancellationToken, OutputMode, SessionOptions};
use planner::QuickForm;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "trip-planner")]
#[command(about = "Conversational trip planner - chaotic itineraries from an LLM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Extra config file, applied over the user and project configs
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend to generate with (overrides defaults.backend)
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Refinement rounds allowed per session (0 = unbounded)
    #[arg(long, global = true)]
    max_refinements: Option<u32>,

    /// Output mode: console, json or quiet
    #[arg(long, global = true, default_value = "console")]
    output: OutputMode,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress log output
    #[arg(long, global = true)]
    quiet: bool,

    /// Also log to a file (default path under the config dir)
    #[arg(long, global = true)]
    log_file: Option<Option<PathBuf>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a trip through the full conversation (default)
    Plan {
        /// Read answers from a file, one per line, instead of the terminal
        #[arg(long)]
        answers: Option<PathBuf>,
    },

    /// Generate an itinerary from a short form
    Quick {
        /// Destination city; without it, forms are read from the terminal
        #[arg(long)]
        city: Option<String>,

        /// Comma-separated interests
        #[arg(long, requires = "city")]
        interests: Option<String>,

        #[arg(long, default_value = planner::DEFAULT_BUDGET)]
        budget: String,

        #[arg(long, default_value = planner::DEFAULT_DURATION)]
        duration: String,

        #[arg(long, default_value = planner::DEFAULT_TRAVEL_STYLE)]
        style: String,

        /// Append a random follow-up suggestion and tip to the itinerary
        #[arg(long)]
        follow_up: bool,
    },

    /// Check backend availability
    Doctor,

    /// Validate prompt templates, including configured overrides
    Validate,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Plan { .. } => "plan",
            Commands::Quick { .. } => "quick",
            Commands::Doctor => "doctor",
            Commands::Validate => "validate",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Plan { answers: None });

    let log_file = match cli.log_file {
        Some(Some(path)) => Some(path),
        Some(None) => Some(logging::default_log_path(command.name())?),
        None => None,
    };
    let _log_guard = logging::init_logging(cli.debug, cli.quiet, log_file)?;

    let config = config::PlannerConfig::load(cli.config.as_deref())?;
    let handler: Arc<dyn cli::OutputHandler> = Arc::from(cli::create_handler(cli.output, cli.debug));

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = cli::setup_signal_handlers(signal_token).await {
            tracing::warn!(error = %e, "failed to install signal handlers");
        }
    });

    let options = SessionOptions {
        backend: cli.backend.as_deref(),
        max_refinements: cli.max_refinements,
        cancel,
    };

    let code = match command {
        Commands::Plan { answers } => cli::plan(&config, options, answers.as_deref(), handler).await?,
        Commands::Quick {
            city,
            interests,
            budget,
            duration,
            style,
            follow_up,
        } => {
            let form = city.map(|city| QuickForm {
                budget,
                duration,
                travel_style: style,
                ..QuickForm::new(city, interests.unwrap_or_default())
            });
            cli::quick(&config, options, form, follow_up, handler).await?
        }
        Commands::Doctor => cli::doctor(&config, handler.as_ref()).await,
        Commands::Validate => cli::validate(&config, handler.as_ref()),
    };

    if code != 0 {
        drop(_log_guard);
        std::process::exit(code);
    }
    Ok(())
}
