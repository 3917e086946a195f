use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use watchlist_config::{Config, PathManager};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "watchlist")]
#[command(about = "Watchlist - keep track of the movies you still want to see")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to a file instead of stderr (the configured file, or the default log directory)
    #[arg(long, global = true)]
    log_to_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the watchlist
    List,
    /// Add a movie to the watchlist
    Add {
        /// Movie title (whitespace is trimmed, words are capitalized)
        title: String,
    },
    /// Remove a movie from the watchlist
    Remove {
        /// Title to remove, matched ignoring case
        #[arg(required_unless_present = "index")]
        title: Option<String>,

        /// Remove by list number as shown by `list` (starting at 1)
        #[arg(long, conflicts_with = "title")]
        index: Option<usize>,
    },
    /// Show watchlist entries the watched-status service confirms as watched
    Watched,
    /// Show watchlist entries not watched yet
    Unwatched,
    /// Record a movie as watched
    MarkWatched {
        title: String,

        /// Rating from 1 to 10
        #[arg(long)]
        rating: Option<u8>,

        /// Date watched (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        date: Option<NaiveDate>,
    },
    /// Record a movie as not watched
    MarkUnwatched { title: String },
    /// Show the watched status of one movie
    Status { title: String },
    /// Show whether each backing service answered the startup probe
    Health,
    /// Menu-driven session
    Interactive,
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration (file, defaults and environment overrides)
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = PathManager::default();
    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let config = Config::load_or_default(&config_path)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_path.display(), e))?;

    let log_file = match (&config.logging.file, cli.log_to_file) {
        (Some(file), _) => Some(file.clone()),
        (None, true) => {
            paths
                .ensure_directories()
                .map_err(|e| color_eyre::eyre::eyre!("Failed to create log directory: {}", e))?;
            Some(paths.default_log_file())
        }
        (None, false) => None,
    };

    logging::init_logging(cli.verbose, cli.quiet, &config.logging.level, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Config { cmd } => commands::config::run_config(cmd, &config, &config_path, &output),
        command => {
            // The command future owns the store and its sockets; leaving `select!`
            // drops it, so the sockets are released before exiting.
            let finished = tokio::select! {
                result = commands::run(command, &config, &output) => Some(result),
                _ = tokio::signal::ctrl_c() => None,
            };

            match finished {
                Some(result) => result,
                None => {
                    info!(operation = "interrupted", "Interrupted, exiting");
                    output.warn("Interrupted");
                    std::process::exit(130);
                }
            }
        }
    }
}
