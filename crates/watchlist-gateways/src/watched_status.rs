use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};
use watchlist_models::{MovieStatus, MovieTitle, Rating, WatchStatus};
use crate::channel::{report_failure, ChannelContext, RequestChannel};
use crate::connection::ServiceConnection;
use crate::health::ServiceHealth;
use crate::protocol::Request;

const SERVICE: &str = "watched_status";

#[derive(Deserialize)]
struct Ack {}

// Rows are left undecoded; only the reply's shape decides the probe
#[derive(Deserialize)]
struct ProbeReply {
    #[serde(default)]
    movies: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct AllMoviesReply {
    #[serde(default)]
    movies: Vec<MovieStatus>,
}

#[derive(Deserialize)]
struct UnwatchedReply {
    #[serde(default)]
    unwatched_movies: Vec<String>,
}

#[derive(Deserialize)]
struct WatchedReply {
    #[serde(default)]
    watched_movies: Vec<String>,
}

#[derive(Deserialize)]
struct FilteredReply {
    #[serde(default)]
    filtered_movies: Vec<String>,
}

/// Client for the service that records which movies were watched.
///
/// When the service cannot answer, list queries fall back in the direction that
/// hides nothing: unknown movies count as unwatched, and nothing is reported as
/// watched without the service confirming it.
pub struct WatchedStatusGateway {
    connection: ServiceConnection,
}

impl WatchedStatusGateway {
    pub async fn connect(context: &ChannelContext, endpoint: &str) -> Self {
        let connection = ServiceConnection::open(context, SERVICE, endpoint).await;
        Self::probe(connection).await
    }

    pub async fn with_channel(channel: RequestChannel) -> Self {
        Self::probe(ServiceConnection::from_channel(channel)).await
    }

    // `get_all_movies` is read-only, so it doubles as the availability probe
    async fn probe(mut connection: ServiceConnection) -> Self {
        if connection.health() == ServiceHealth::Unprobed {
            let succeeded = match connection.request::<ProbeReply>(Request::GetAllMovies).await {
                Ok(reply) => {
                    debug!(service = SERVICE, movies = reply.movies.len(), "Watched-status service answered");
                    true
                }
                Err(e) => {
                    report_failure(SERVICE, "get_all_movies", &e);
                    false
                }
            };
            connection.record_probe(succeeded);
        }
        Self { connection }
    }

    pub fn health(&self) -> ServiceHealth {
        self.connection.health()
    }

    pub fn is_available(&self) -> bool {
        self.connection.is_available()
    }

    pub async fn mark_watched(&mut self, title: &MovieTitle, rating: Option<Rating>, watch_date: Option<NaiveDate>) -> bool {
        let request = Request::MarkWatched {
            title: title.to_string(),
            rating,
            watch_date,
        };
        self.acknowledge(request).await
    }

    pub async fn mark_unwatched(&mut self, title: &MovieTitle, rating: Option<Rating>, watch_date: Option<NaiveDate>) -> bool {
        let request = Request::MarkUnwatched {
            title: title.to_string(),
            rating,
            watch_date,
        };
        self.acknowledge(request).await
    }

    /// `None` means the status could not be determined, not that the movie is unwatched
    pub async fn get_status(&mut self, title: &MovieTitle) -> Option<WatchStatus> {
        if !self.is_available() {
            return None;
        }

        let request = Request::GetStatus {
            title: title.to_string(),
        };
        match self.connection.request::<WatchStatus>(request).await {
            Ok(status) => Some(status),
            Err(e) => {
                report_failure(SERVICE, "get_status", &e);
                None
            }
        }
    }

    /// Every movie the service knows about. `None` when the service could not be
    /// asked, so callers can tell that apart from an empty collection.
    pub async fn get_all_movies(&mut self) -> Option<Vec<MovieStatus>> {
        if !self.is_available() {
            return None;
        }

        match self.connection.request::<AllMoviesReply>(Request::GetAllMovies).await {
            Ok(reply) => Some(reply.movies),
            Err(e) => {
                report_failure(SERVICE, "get_all_movies", &e);
                None
            }
        }
    }

    /// Watched movies across the service's whole collection; empty when unknown
    pub async fn get_watched_movies(&mut self) -> Vec<MovieStatus> {
        self.get_all_movies()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|movie| movie.watched)
            .collect()
    }

    /// Unwatched movies across the service's whole collection; empty when unknown
    pub async fn get_unwatched_movies(&mut self) -> Vec<MovieStatus> {
        self.get_all_movies()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|movie| !movie.watched)
            .collect()
    }

    /// The entries of `movie_list` not yet watched. Falls back to the whole list.
    pub async fn get_unwatched_from_list(&mut self, movie_list: &[String]) -> Vec<String> {
        if self.is_available() {
            let request = Request::GetUnwatchedFromList {
                movie_list: movie_list.to_vec(),
            };
            match self.connection.request::<UnwatchedReply>(request).await {
                Ok(reply) => return reply.unwatched_movies,
                Err(e) => report_failure(SERVICE, "get_unwatched_from_list", &e),
            }
        }

        warn!(
            service = SERVICE,
            operation = "get_unwatched_from_list",
            "Watch status service unavailable, showing all movies"
        );
        movie_list.to_vec()
    }

    /// The entries of `movie_list` confirmed as watched. Falls back to nothing.
    pub async fn get_watched_from_list(&mut self, movie_list: &[String]) -> Vec<String> {
        if self.is_available() {
            let request = Request::GetWatchedFromList {
                movie_list: movie_list.to_vec(),
            };
            match self.connection.request::<WatchedReply>(request).await {
                Ok(reply) => return reply.watched_movies,
                Err(e) => report_failure(SERVICE, "get_watched_from_list", &e),
            }
        }

        warn!(
            service = SERVICE,
            operation = "get_watched_from_list",
            "Watch status service unavailable, cannot verify watched movies"
        );
        Vec::new()
    }

    /// Server-side filter on `watched`, with the same fallbacks as the two list queries
    pub async fn filter_by_status(&mut self, movie_list: &[String], watched: bool) -> Vec<String> {
        if self.is_available() {
            let request = Request::FilterByStatus {
                movie_list: movie_list.to_vec(),
                watched,
            };
            match self.connection.request::<FilteredReply>(request).await {
                Ok(reply) => return reply.filtered_movies,
                Err(e) => report_failure(SERVICE, "filter_by_status", &e),
            }
        }

        warn!(
            service = SERVICE,
            operation = "filter_by_status",
            watched,
            "Watch status service unavailable, falling back to {}",
            if watched { "no movies" } else { "all movies" }
        );
        if watched {
            Vec::new()
        } else {
            movie_list.to_vec()
        }
    }

    pub async fn close(&mut self) {
        self.connection.close().await;
    }

    async fn acknowledge(&mut self, request: Request) -> bool {
        if !self.is_available() {
            return false;
        }

        let action = request.action();
        match self.connection.request::<Ack>(request).await {
            Ok(Ack {}) => true,
            Err(e) => {
                report_failure(SERVICE, action, &e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryWatchedStatusService, ScriptedTransport};
    use serde_json::json;
    use std::time::Duration;

    fn context() -> ChannelContext {
        ChannelContext::new(Duration::from_millis(50), 1)
    }

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn title(name: &str) -> MovieTitle {
        MovieTitle::parse(name).unwrap()
    }

    async fn unavailable_gateway() -> (WatchedStatusGateway, crate::testing::RequestLog) {
        let transport = ScriptedTransport::new().hang();
        let log = transport.log();
        let gateway = WatchedStatusGateway::with_channel(context().channel(SERVICE, Box::new(transport))).await;
        assert_eq!(gateway.health(), ServiceHealth::Unavailable);
        (gateway, log)
    }

    async fn memory_gateway(service: &MemoryWatchedStatusService) -> WatchedStatusGateway {
        WatchedStatusGateway::with_channel(context().channel(SERVICE, Box::new(service.clone()))).await
    }

    #[tokio::test]
    async fn test_unavailable_fallbacks() {
        let (mut gateway, log) = unavailable_gateway().await;
        let list = titles(&["Zodiac", "Alien", "Heat"]);

        assert_eq!(gateway.get_unwatched_from_list(&list).await, list);
        assert!(gateway.get_watched_from_list(&list).await.is_empty());
        assert_eq!(gateway.filter_by_status(&list, false).await, list);
        assert!(gateway.filter_by_status(&list, true).await.is_empty());
        assert!(!gateway.mark_watched(&title("Heat"), None, None).await);
        assert!(!gateway.mark_unwatched(&title("Heat"), None, None).await);
        assert_eq!(gateway.get_status(&title("Heat")).await, None);
        assert_eq!(gateway.get_all_movies().await, None);
        assert!(gateway.get_watched_movies().await.is_empty());
        assert!(gateway.get_unwatched_movies().await.is_empty());

        // only the probe ever went out
        assert_eq!(log.actions(), vec!["get_all_movies"]);
    }

    #[tokio::test]
    async fn test_odd_movie_rows_do_not_fail_startup_check() {
        let rows = [
            json!([{"title": "Heat", "watched": null}]),
            json!([{"title": "Heat", "rating": 8.5}]),
            json!([{"watched": true}]),
        ];

        for movies in rows {
            let transport = ScriptedTransport::new()
                .reply(json!({"status": "success", "movies": movies.clone()}))
                .reply(json!({"status": "success", "movies": movies}));
            let mut gateway = WatchedStatusGateway::with_channel(context().channel(SERVICE, Box::new(transport))).await;

            assert_eq!(gateway.health(), ServiceHealth::Available);
            // the row itself is still rejected when the full set is asked for
            assert_eq!(gateway.get_all_movies().await, None);
        }
    }

    #[tokio::test]
    async fn test_non_list_movies_fails_startup_check() {
        let transport = ScriptedTransport::new().reply(json!({"status": "success", "movies": "Heat"}));
        let gateway = WatchedStatusGateway::with_channel(context().channel(SERVICE, Box::new(transport))).await;
        assert_eq!(gateway.health(), ServiceHealth::Unavailable);
    }

    #[tokio::test]
    async fn test_failed_call_on_available_gateway_uses_fallbacks() {
        let transport = ScriptedTransport::new()
            .reply(json!({"status": "success", "movies": []}))
            .reply(json!({"status": "error"}))
            .reply(json!({"status": "success", "watched_movies": "Heat"}))
            .fail("connection reset")
            .fail("connection reset");
        let mut gateway = WatchedStatusGateway::with_channel(context().channel(SERVICE, Box::new(transport))).await;
        assert!(gateway.is_available());
        let list = titles(&["Alien", "Heat"]);

        assert_eq!(gateway.get_unwatched_from_list(&list).await, list);
        assert!(gateway.get_watched_from_list(&list).await.is_empty());
        assert_eq!(gateway.filter_by_status(&list, false).await, list);
        assert!(gateway.filter_by_status(&list, true).await.is_empty());
    }

    #[tokio::test]
    async fn test_get_all_movies_distinguishes_empty_from_unknown() {
        let service = MemoryWatchedStatusService::new();
        let mut gateway = memory_gateway(&service).await;
        assert_eq!(gateway.get_all_movies().await, Some(Vec::new()));

        let (mut down, _) = unavailable_gateway().await;
        assert_eq!(down.get_all_movies().await, None);
    }

    #[tokio::test]
    async fn test_mark_and_query_against_service() {
        let service = MemoryWatchedStatusService::new();
        let mut gateway = memory_gateway(&service).await;
        let date = NaiveDate::from_ymd_opt(2024, 2, 29);

        assert!(gateway.mark_watched(&title("heat"), Some(Rating::new(9).unwrap()), date).await);
        assert!(gateway.mark_unwatched(&title("Alien"), None, None).await);

        let status = gateway.get_status(&title("Heat")).await.unwrap();
        assert!(status.watched);
        assert_eq!(status.rating, Some(9));
        assert_eq!(status.parsed_watch_date(), date);

        let list = titles(&["Alien", "Heat", "Zodiac"]);
        assert_eq!(gateway.get_watched_from_list(&list).await, titles(&["Heat"]));
        assert_eq!(gateway.get_unwatched_from_list(&list).await, titles(&["Alien", "Zodiac"]));
        assert_eq!(gateway.filter_by_status(&list, true).await, titles(&["Heat"]));
        assert_eq!(gateway.filter_by_status(&list, false).await, titles(&["Alien", "Zodiac"]));

        let watched: Vec<String> = gateway.get_watched_movies().await.into_iter().map(|m| m.title).collect();
        let unwatched: Vec<String> = gateway.get_unwatched_movies().await.into_iter().map(|m| m.title).collect();
        assert_eq!(watched, titles(&["Heat"]));
        assert_eq!(unwatched, titles(&["Alien"]));
    }

    #[tokio::test]
    async fn test_mark_watched_request_shape() {
        let transport = ScriptedTransport::new()
            .reply(json!({"status": "success", "movies": []}))
            .reply(json!({"status": "success"}));
        let log = transport.log();
        let mut gateway = WatchedStatusGateway::with_channel(context().channel(SERVICE, Box::new(transport))).await;

        assert!(gateway.mark_watched(&title("the thing"), Some(Rating::new(10).unwrap()), None).await);
        assert_eq!(
            log.requests()[1],
            json!({"action": "mark_watched", "version": 1, "title": "The Thing", "rating": 10})
        );
    }
}
