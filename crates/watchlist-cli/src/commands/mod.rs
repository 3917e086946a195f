pub mod config;
pub mod interactive;
pub mod prompts;
pub mod watchlist;

use crate::output::Output;
use crate::Commands;
use color_eyre::Result;
use watchlist_config::Config;
use watchlist_core::WatchlistStore;
use watchlist_gateways::{ChannelContext, ServiceHealth};

/// Open the store, run one command against it, release the connections
pub async fn run(command: Commands, config: &Config, output: &Output) -> Result<()> {
    let mut store = open_store(config, output).await;

    let result = match command {
        Commands::List => watchlist::run_list(&store, output),
        Commands::Add { title } => watchlist::run_add(&mut store, &title, output).await,
        Commands::Remove { title, index } => watchlist::run_remove(&mut store, title, index, output).await,
        Commands::Watched => watchlist::run_watched(&mut store, output).await,
        Commands::Unwatched => watchlist::run_unwatched(&mut store, output).await,
        Commands::MarkWatched { title, rating, date } => {
            watchlist::run_mark_watched(&mut store, &title, rating, date, output).await
        }
        Commands::MarkUnwatched { title } => watchlist::run_mark_unwatched(&mut store, &title, output).await,
        Commands::Status { title } => watchlist::run_status(&mut store, &title, output).await,
        Commands::Health => watchlist::run_health(&store, config, output),
        Commands::Interactive => interactive::run_interactive(&mut store, output).await,
        // handled in main before any service is contacted
        Commands::Config { .. } => Ok(()),
    };

    store.close().await;
    result
}

async fn open_store(config: &Config, output: &Output) -> WatchlistStore {
    let context = ChannelContext::from_config(&config.channel);
    let store = WatchlistStore::open(&context, config).await;

    if store.persistence_health() == ServiceHealth::Unavailable {
        output.warn("Persistence service unavailable: changes will be saved only within this session.");
    }
    if store.watched_status_health() == ServiceHealth::Unavailable {
        output.warn("Watched-status service unavailable: watched tracking is disabled for this session.");
    }

    store
}
