//! contango CLI - continuous MOEX futures history into SQLite.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use contango_lib::{Timeframe, YearMonth};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod display;

#[derive(Parser)]
#[command(name = "contango")]
#[command(about = "Continuous futures history downloader for MOEX", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// JSON settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database URL. Defaults to contango.db in the platform data directory.
    #[arg(long, env = "CONTANGO_DATABASE_URL", global = true)]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    InitDb,

    /// Fetch, glue and store continuous history
    Sync {
        /// Instrument identifiers (e.g., BR, Si, GOLD)
        #[arg(required = true)]
        instruments: Vec<String>,

        /// Timeframes to update (comma separated). Defaults to M1,M5,M15,H1,D1.
        #[arg(short, long, value_delimiter = ',')]
        timeframes: Vec<Timeframe>,

        /// Ignore the stored watermark and rebuild the whole series
        #[arg(long)]
        full: bool,

        /// First contract month (YYYY-MM)
        #[arg(long)]
        start_month: Option<YearMonth>,

        /// Last contract month (YYYY-MM). Defaults to the current month.
        #[arg(long)]
        end_month: Option<YearMonth>,

        /// Maximum instruments synced at once
        #[arg(long, default_value = "2")]
        parallel_instruments: usize,
    },

    /// Show contract windows for an instrument
    Contracts {
        /// Instrument identifier
        instrument: String,

        /// First contract month (YYYY-MM)
        #[arg(long)]
        start_month: Option<YearMonth>,

        /// Last contract month (YYYY-MM). Defaults to the current month.
        #[arg(long)]
        end_month: Option<YearMonth>,
    },

    /// List contracts traded on the MOEX futures board
    Futures {
        /// Asset code or contract code prefix (e.g., BR)
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// List known instruments
    List {
        /// Search pattern
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List stored securities with candle counts
    Securities,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let database_url = cli.database_url.as_deref();
    let config_path = cli.config.as_deref();

    match command {
        Commands::InitDb => commands::init_db::init_db(database_url).await,
        Commands::Sync {
            instruments,
            timeframes,
            full,
            start_month,
            end_month,
            parallel_instruments,
        } => {
            let settings = config::load_settings(config_path, start_month, end_month)?;
            commands::sync::sync(
                &instruments,
                &timeframes,
                full,
                parallel_instruments,
                settings,
                database_url,
                cli.quiet,
            )
            .await
        }
        Commands::Contracts {
            instrument,
            start_month,
            end_month,
        } => {
            let settings = config::load_settings(config_path, start_month, end_month)?;
            commands::contracts::show_contracts(&instrument, &settings).await
        }
        Commands::Futures { prefix } => commands::futures::list_futures(prefix.as_deref()).await,
        Commands::List { search } => commands::list::list_instruments(search.as_deref()),
        Commands::Securities => commands::securities::list_securities(database_url).await,
    }
}
