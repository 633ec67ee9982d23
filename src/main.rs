use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use kalenteri::commands::{self, CommandContext};
use kalenteri::config::Config;
use kalenteri::startup;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Parser)]
#[command(name = "kalenteri")]
#[command(version, about = "Browse and export events from an iCalendar feed")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List upcoming events grouped by day
    Agenda {
        /// Number of days to show, starting today
        #[arg(short, long, default_value_t = 14)]
        days: u32,
    },
    /// Show events on one date
    Day {
        /// Date as YYYY-MM-DD (defaults to today)
        date: Option<NaiveDate>,
    },
    /// Show a month grid and the month's events
    Month {
        /// Year (defaults to the current year)
        year: Option<i32>,
        /// Month number 1-12 (defaults to the current month)
        #[arg(value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
    /// Write one event to an .ics file
    Export {
        /// Event id as shown in listings
        id: String,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Print a Google Calendar link for one event
    Link {
        /// Event id as shown in listings
        id: String,
    },
    /// Fetch the feed now, ignoring the cache age
    Refresh,
    /// Remove the cached feed
    ClearCache,
    /// Keep refreshing the feed until interrupted
    Watch,
}

impl Commands {
    /// Runs until a signal, whose handler shuts the components down itself
    fn runs_until_signal(&self) -> bool {
        matches!(self, Commands::Watch)
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    startup::init_logging()?;

    info!("Starting Kalenteri");

    // Load configuration
    let config = startup::load_config().await?;

    let output = run_command(config, cli.command).await?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}

/// Start the feed source and run one command against it
async fn run_command(config: Arc<RwLock<Config>>, command: Commands) -> miette::Result<String> {
    let watch = command.runs_until_signal();
    let component_manager = startup::start_components(Arc::clone(&config), watch).await?;
    let ctx = CommandContext::new(config, Arc::clone(&component_manager));

    let result = match command {
        Commands::Agenda { days } => commands::calendar::agenda(&ctx, days).await,
        Commands::Day { date } => commands::calendar::day(&ctx, date).await,
        Commands::Month { year, month } => commands::calendar::month(&ctx, year, month).await,
        Commands::Export { id, out } => commands::export::export(&ctx, &id, &out).await,
        Commands::Link { id } => commands::export::link(&ctx, &id).await,
        Commands::Refresh => commands::calendar::refresh(&ctx).await,
        Commands::ClearCache => commands::calendar::clear_cache(&ctx).await,
        Commands::Watch => {
            startup::wait_for_shutdown(Arc::clone(&component_manager)).await;
            Ok(String::new())
        }
    };

    if !watch {
        component_manager.shutdown_all().await?;
    }

    Ok(result?)
}
