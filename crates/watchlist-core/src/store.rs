use chrono::NaiveDate;
use tracing::{debug, info, warn};
use watchlist_config::Config;
use watchlist_gateways::{ChannelContext, Outcome, PersistenceGateway, ServiceHealth, WatchedStatusGateway};
use watchlist_models::{MovieTitle, Rating, WatchStatus};
use crate::error::WatchlistError;

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// Nothing left after trimming; the list is untouched
    Blank,
    AlreadyPresent(MovieTitle),
    /// Appended locally. `persisted` is false when the change lasts only for this session.
    Added { title: MovieTitle, persisted: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    EmptyList,
    NotFound,
    Removed { title: MovieTitle, persisted: bool },
}

impl RemoveOutcome {
    pub fn found(&self) -> bool {
        matches!(self, RemoveOutcome::Removed { .. })
    }
}

/// The session's watchlist: ordered, free of case-insensitive duplicates, never
/// holding a blank title.
///
/// The in-memory list is authoritative. Every mutation is pushed to the persistence
/// service afterwards, and a failed save never undoes the change.
pub struct WatchlistStore {
    titles: Vec<MovieTitle>,
    persistence: PersistenceGateway,
    watched_status: WatchedStatusGateway,
}

impl WatchlistStore {
    /// Connect and probe both services, then seed the list from whatever the
    /// persistence probe returned
    pub async fn open(context: &ChannelContext, config: &Config) -> Self {
        let persistence = PersistenceGateway::connect(context, &config.persistence.endpoint).await;
        let watched_status = WatchedStatusGateway::connect(context, &config.watched_status.endpoint).await;
        Self::new(persistence, watched_status)
    }

    pub fn new(mut persistence: PersistenceGateway, watched_status: WatchedStatusGateway) -> Self {
        let loaded = persistence.take_probed_items();
        let loaded_count = loaded.len();

        let mut titles: Vec<MovieTitle> = Vec::with_capacity(loaded_count);
        for raw in loaded {
            match MovieTitle::parse(&raw) {
                Ok(title) if titles.iter().any(|t| t.matches(title.as_str())) => {
                    debug!(title = %title, "Dropping duplicate title from saved watchlist");
                }
                Ok(title) => titles.push(title),
                Err(_) => debug!("Dropping blank title from saved watchlist"),
            }
        }

        info!(
            operation = "watchlist_loaded",
            loaded = loaded_count,
            kept = titles.len(),
            persistence = %persistence.health(),
            watched_status = %watched_status.health(),
            "Watchlist ready"
        );

        Self {
            titles,
            persistence,
            watched_status,
        }
    }

    pub async fn add(&mut self, title: &str) -> AddOutcome {
        let title = match MovieTitle::parse(title) {
            Ok(title) => title,
            Err(_) => return AddOutcome::Blank,
        };

        if let Some(existing) = self.find(title.as_str()) {
            return AddOutcome::AlreadyPresent(self.titles[existing].clone());
        }

        self.titles.push(title.clone());
        let persisted = self.persist().await;
        AddOutcome::Added { title, persisted }
    }

    pub async fn remove(&mut self, title: &str) -> RemoveOutcome {
        if self.titles.is_empty() {
            return RemoveOutcome::EmptyList;
        }

        match self.find(title) {
            Some(index) => {
                let title = self.titles.remove(index);
                let persisted = self.persist().await;
                RemoveOutcome::Removed { title, persisted }
            }
            None => RemoveOutcome::NotFound,
        }
    }

    /// Titles in insertion order. Callers number them from 1 for display.
    pub fn view(&self) -> &[MovieTitle] {
        &self.titles
    }

    /// Zero-based lookup
    pub fn get_at_index(&self, index: usize) -> Result<&MovieTitle, WatchlistError> {
        self.titles.get(index).ok_or(WatchlistError::InvalidIndex {
            index,
            len: self.titles.len(),
        })
    }

    pub fn contains(&self, title: &str) -> bool {
        self.find(title).is_some()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn persistence_health(&self) -> ServiceHealth {
        self.persistence.health()
    }

    pub fn watched_status_health(&self) -> ServiceHealth {
        self.watched_status.health()
    }

    pub async fn mark_as_watched(&mut self, title: &str, rating: Option<u8>) -> Outcome<()> {
        self.mark_as_watched_on(title, rating, None).await
    }

    /// Validation happens before the service is considered, so bad input is
    /// reported as `Invalid` even while the service is down.
    pub async fn mark_as_watched_on(&mut self, title: &str, rating: Option<u8>, watch_date: Option<NaiveDate>) -> Outcome<()> {
        let title = match MovieTitle::parse(title) {
            Ok(title) => title,
            Err(e) => return Outcome::Invalid(e),
        };
        let rating = match Rating::from_optional(rating) {
            Ok(rating) => rating,
            Err(e) => return Outcome::Invalid(e),
        };

        if !self.watched_status.is_available() {
            return Outcome::Unavailable;
        }
        if self.watched_status.mark_watched(&title, rating, watch_date).await {
            Outcome::Success(())
        } else {
            Outcome::Unavailable
        }
    }

    pub async fn mark_as_unwatched(&mut self, title: &str) -> Outcome<()> {
        let title = match MovieTitle::parse(title) {
            Ok(title) => title,
            Err(e) => return Outcome::Invalid(e),
        };

        if !self.watched_status.is_available() {
            return Outcome::Unavailable;
        }
        if self.watched_status.mark_unwatched(&title, None, None).await {
            Outcome::Success(())
        } else {
            Outcome::Unavailable
        }
    }

    pub async fn watch_status(&mut self, title: &str) -> Outcome<WatchStatus> {
        let title = match MovieTitle::parse(title) {
            Ok(title) => title,
            Err(e) => return Outcome::Invalid(e),
        };

        match self.watched_status.get_status(&title).await {
            Some(status) => Outcome::Success(status),
            None => Outcome::Unavailable,
        }
    }

    /// Watchlist entries not yet watched. Empty, without asking, while the
    /// watched-status service is unavailable.
    pub async fn get_unwatched_movies(&mut self) -> Vec<String> {
        if !self.watched_status.is_available() {
            return Vec::new();
        }
        let list = self.title_strings();
        self.watched_status.get_unwatched_from_list(&list).await
    }

    /// Watchlist entries confirmed as watched. Empty, without asking, while the
    /// watched-status service is unavailable.
    pub async fn get_watched_movies(&mut self) -> Vec<String> {
        if !self.watched_status.is_available() {
            return Vec::new();
        }
        let list = self.title_strings();
        self.watched_status.get_watched_from_list(&list).await
    }

    /// Release both service connections
    pub async fn close(&mut self) {
        self.persistence.close().await;
        self.watched_status.close().await;
        debug!("Closed service connections");
    }

    fn find(&self, title: &str) -> Option<usize> {
        self.titles.iter().position(|t| t.matches(title))
    }

    fn title_strings(&self) -> Vec<String> {
        self.titles.iter().map(|t| t.to_string()).collect()
    }

    async fn persist(&mut self) -> bool {
        let items = self.title_strings();
        let saved = self.persistence.save(&items).await;
        if !saved {
            warn!(
                operation = "persist_watchlist",
                items = items.len(),
                "Change saved only within this session"
            );
        }
        saved
    }
}
