use crate::output::Output;
use chrono::NaiveDate;
use color_eyre::Result;
use serde_json::json;
use watchlist_config::Config;
use watchlist_core::{AddOutcome, RemoveOutcome, WatchlistStore};
use watchlist_gateways::Outcome;
use watchlist_models::MovieTitle;

pub const SESSION_ONLY_NOTICE: &str = "Your watchlist could not be saved; this change is kept only within this session.";

pub fn run_list(store: &WatchlistStore, output: &Output) -> Result<()> {
    print_watchlist(store, output);
    Ok(())
}

pub fn print_watchlist(store: &WatchlistStore, output: &Output) {
    let titles: Vec<&str> = store.view().iter().map(MovieTitle::as_str).collect();
    output.json(&json!({ "watchlist": titles }));

    if !output.is_human() {
        return;
    }
    if titles.is_empty() {
        output.info("Your watchlist is currently empty.");
        return;
    }
    for (number, title) in titles.iter().enumerate() {
        output.info(format!("{}. {}", number + 1, title));
    }
}

pub async fn run_add(store: &mut WatchlistStore, title: &str, output: &Output) -> Result<()> {
    report_add(store.add(title).await, output);
    Ok(())
}

pub fn report_add(outcome: AddOutcome, output: &Output) {
    match outcome {
        AddOutcome::Blank => output.error("Movie title cannot be blank."),
        AddOutcome::AlreadyPresent(title) => output.warn(format!("{} is already in your watchlist.", title)),
        AddOutcome::Added { title, persisted } => {
            output.success(format!("\"{}\" has been successfully added to your watchlist.", title));
            if !persisted {
                output.warn(SESSION_ONLY_NOTICE);
            }
        }
    }
}

pub async fn run_remove(store: &mut WatchlistStore, title: Option<String>, index: Option<usize>, output: &Output) -> Result<()> {
    let title = match (title, index) {
        (_, Some(number)) => {
            // list numbers start at 1
            match number.checked_sub(1).map(|i| store.get_at_index(i)) {
                Some(Ok(title)) => title.to_string(),
                _ => {
                    output.error(format!("No movie with number {} exists.", number));
                    return Ok(());
                }
            }
        }
        (Some(title), None) => title,
        (None, None) => {
            output.error("Give a title or --index to remove.");
            return Ok(());
        }
    };

    report_remove(&title, store.remove(&title).await, output);
    Ok(())
}

pub fn report_remove(requested: &str, outcome: RemoveOutcome, output: &Output) {
    match outcome {
        RemoveOutcome::EmptyList => output.warn("There are no movies to remove. Your watchlist is empty."),
        RemoveOutcome::NotFound => output.error(format!("\"{}\" not found in your watchlist.", requested.trim())),
        RemoveOutcome::Removed { title, persisted } => {
            output.success(format!("\"{}\" was successfully removed from your watchlist.", title));
            if !persisted {
                output.warn(SESSION_ONLY_NOTICE);
            }
        }
    }
}

pub async fn run_watched(store: &mut WatchlistStore, output: &Output) -> Result<()> {
    let watched = store.get_watched_movies().await;
    print_titles("Watched", &watched, output);
    Ok(())
}

pub async fn run_unwatched(store: &mut WatchlistStore, output: &Output) -> Result<()> {
    let unwatched = store.get_unwatched_movies().await;
    print_titles("Unwatched", &unwatched, output);
    Ok(())
}

fn print_titles(label: &str, titles: &[String], output: &Output) {
    let key = label.to_lowercase();
    output.json(&json!({ key: titles }));

    if !output.is_human() {
        return;
    }
    if titles.is_empty() {
        output.info(format!("{} movies: none to show.", label));
        return;
    }
    output.info(format!("{} movies:", label));
    for (number, title) in titles.iter().enumerate() {
        output.info(format!("{}. {}", number + 1, title));
    }
}

pub async fn run_mark_watched(
    store: &mut WatchlistStore,
    title: &str,
    rating: Option<u8>,
    date: Option<NaiveDate>,
    output: &Output,
) -> Result<()> {
    report_mark(title, "watched", store.mark_as_watched_on(title, rating, date).await, output);
    Ok(())
}

pub async fn run_mark_unwatched(store: &mut WatchlistStore, title: &str, output: &Output) -> Result<()> {
    report_mark(title, "unwatched", store.mark_as_unwatched(title).await, output);
    Ok(())
}

pub fn report_mark(title: &str, state: &str, outcome: Outcome<()>, output: &Output) {
    let shown = MovieTitle::parse(title).map(|t| t.to_string()).unwrap_or_default();
    match outcome {
        Outcome::Success(()) => output.success(format!("\"{}\" marked as {}.", shown, state)),
        Outcome::Unavailable => output.error(format!(
            "Could not mark \"{}\" as {}: watched-status service unavailable.",
            shown, state
        )),
        Outcome::Invalid(e) => output.error(format!("Invalid input: {}.", e)),
    }
}

pub async fn run_status(store: &mut WatchlistStore, title: &str, output: &Output) -> Result<()> {
    match store.watch_status(title).await {
        Outcome::Success(status) => {
            output.json(&json!({
                "title": MovieTitle::parse(title).map(|t| t.to_string()).unwrap_or_default(),
                "watched": status.watched,
                "rating": status.rating,
                "watch_date": status.watch_date,
            }));
            if output.is_human() {
                let mut line = if status.watched { "Watched".to_string() } else { "Not watched".to_string() };
                if let Some(rating) = status.rating {
                    line.push_str(&format!(", rated {}/10", rating));
                }
                if let Some(date) = status.parsed_watch_date() {
                    line.push_str(&format!(", on {}", date));
                }
                output.info(line);
            }
        }
        Outcome::Unavailable => output.error("Watch status unknown: watched-status service unavailable."),
        Outcome::Invalid(e) => output.error(format!("Invalid input: {}.", e)),
    }
    Ok(())
}

pub fn run_health(store: &WatchlistStore, config: &Config, output: &Output) -> Result<()> {
    output.json(&json!({
        "persistence": { "endpoint": config.persistence.endpoint, "health": store.persistence_health() },
        "watched_status": { "endpoint": config.watched_status.endpoint, "health": store.watched_status_health() },
    }));

    if output.is_human() {
        output.info(format!("persistence     {} ({})", store.persistence_health(), config.persistence.endpoint));
        output.info(format!("watched_status  {} ({})", store.watched_status_health(), config.watched_status.endpoint));
    }
    Ok(())
}
