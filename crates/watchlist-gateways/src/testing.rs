//! Transports for tests: scripted replies and in-memory versions of both services.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use crate::error::GatewayError;
use crate::transport::Transport;

/// Every request a test transport received, decoded from JSON
#[derive(Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<Value>>>);

impl RequestLog {
    fn record(&self, raw: &str) -> Value {
        let value: Value = serde_json::from_str(raw).unwrap_or(Value::Null);
        self.0.lock().unwrap().push(value.clone());
        value
    }

    pub fn requests(&self) -> Vec<Value> {
        self.0.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r["action"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

enum Step {
    Reply(String),
    Hang,
    Fail(String),
}

/// Answers each request with the next scripted step
pub struct ScriptedTransport {
    steps: VecDeque<Step>,
    log: RequestLog,
    closed: Arc<AtomicBool>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            log: RequestLog::default(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn reply(mut self, reply: Value) -> Self {
        self.steps.push_back(Step::Reply(reply.to_string()));
        self
    }

    /// Reply with a raw, possibly non-JSON, string
    pub fn raw(mut self, reply: impl Into<String>) -> Self {
        self.steps.push_back(Step::Reply(reply.into()));
        self
    }

    /// Never reply
    pub fn hang(mut self) -> Self {
        self.steps.push_back(Step::Hang);
        self
    }

    pub fn fail(mut self, reason: impl Into<String>) -> Self {
        self.steps.push_back(Step::Fail(reason.into()));
        self
    }

    pub fn log(&self) -> RequestLog {
        self.log.clone()
    }

    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn endpoint(&self) -> &str {
        "scripted://"
    }

    async fn round_trip(&mut self, request: String) -> Result<String, GatewayError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("socket already closed".to_string()));
        }
        self.log.record(&request);

        match self.steps.pop_front() {
            Some(Step::Reply(reply)) => Ok(reply),
            Some(Step::Hang) => std::future::pending().await,
            Some(Step::Fail(reason)) => Err(GatewayError::Transport(reason)),
            None => Err(GatewayError::Transport("script exhausted".to_string())),
        }
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn success(mut fields: Value) -> String {
    if let Value::Object(ref mut object) = fields {
        object.insert("status".to_string(), json!("success"));
    }
    fields.to_string()
}

fn error(message: &str) -> String {
    json!({"status": "error", "message": message}).to_string()
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// In-memory list store speaking the persistence protocol. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryPersistenceService {
    items: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    log: RequestLog,
    closed: Arc<AtomicBool>,
}

impl MemoryPersistenceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let service = Self::new();
        *service.items.lock().unwrap() = items.into_iter().map(Into::into).collect();
        service
    }

    /// Wait this long before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn items(&self) -> Vec<String> {
        self.items.lock().unwrap().clone()
    }

    pub fn log(&self) -> RequestLog {
        self.log.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn handle(&self, request: &Value) -> String {
        match request["action"].as_str() {
            Some("load") => success(json!({"items": self.items()})),
            Some("save") => match string_list(&request["items"]) {
                Some(items) => {
                    *self.items.lock().unwrap() = items;
                    success(json!({}))
                }
                None => error("items must be a list of strings"),
            },
            _ => error("unknown action"),
        }
    }
}

#[async_trait]
impl Transport for MemoryPersistenceService {
    fn endpoint(&self) -> &str {
        "memory://persistence"
    }

    async fn round_trip(&mut self, request: String) -> Result<String, GatewayError> {
        let request = self.log.record(&request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.handle(&request))
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Clone)]
struct Record {
    watched: bool,
    rating: Option<Value>,
    watch_date: Option<Value>,
}

/// In-memory watched-status tracker keyed by exact title. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryWatchedStatusService {
    records: Arc<Mutex<BTreeMap<String, Record>>>,
    log: RequestLog,
    closed: Arc<AtomicBool>,
}

impl MemoryWatchedStatusService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly
    pub fn with_watched(self, title: &str, watched: bool) -> Self {
        self.records.lock().unwrap().insert(
            title.to_string(),
            Record {
                watched,
                rating: None,
                watch_date: None,
            },
        );
        self
    }

    pub fn is_watched(&self, title: &str) -> Option<bool> {
        self.records.lock().unwrap().get(title).map(|r| r.watched)
    }

    pub fn log(&self) -> RequestLog {
        self.log.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn watched(&self, title: &str) -> bool {
        self.is_watched(title).unwrap_or(false)
    }

    fn select(&self, request: &Value, want_watched: bool) -> Option<Vec<String>> {
        let list = string_list(&request["movie_list"])?;
        Some(list.into_iter().filter(|t| self.watched(t) == want_watched).collect())
    }

    fn mark(&self, request: &Value, watched: bool) -> String {
        let Some(title) = request["title"].as_str() else {
            return error("title is required");
        };
        let mut records = self.records.lock().unwrap();
        let record = records.entry(title.to_string()).or_insert(Record {
            watched,
            rating: None,
            watch_date: None,
        });
        record.watched = watched;
        if let Some(rating) = request.get("rating") {
            record.rating = Some(rating.clone());
        }
        if let Some(date) = request.get("watch_date") {
            record.watch_date = Some(date.clone());
        }
        success(json!({}))
    }

    fn handle(&self, request: &Value) -> String {
        match request["action"].as_str() {
            Some("mark_watched") => self.mark(request, true),
            Some("mark_unwatched") => self.mark(request, false),
            Some("get_status") => {
                let title = request["title"].as_str().unwrap_or_default();
                let records = self.records.lock().unwrap();
                match records.get(title) {
                    Some(record) => success(json!({
                        "watched": record.watched,
                        "rating": record.rating,
                        "watch_date": record.watch_date,
                    })),
                    None => success(json!({"watched": false})),
                }
            }
            Some("get_all_movies") => {
                let records = self.records.lock().unwrap();
                let movies: Vec<Value> = records
                    .iter()
                    .map(|(title, record)| {
                        json!({
                            "title": title,
                            "watched": record.watched,
                            "rating": record.rating,
                            "watch_date": record.watch_date,
                        })
                    })
                    .collect();
                success(json!({"movies": movies}))
            }
            Some("get_unwatched_from_list") => match self.select(request, false) {
                Some(list) => success(json!({"unwatched_movies": list})),
                None => error("movie_list must be a list of strings"),
            },
            Some("get_watched_from_list") => match self.select(request, true) {
                Some(list) => success(json!({"watched_movies": list})),
                None => error("movie_list must be a list of strings"),
            },
            Some("filter_by_status") => {
                let watched = request["watched"].as_bool().unwrap_or(true);
                match self.select(request, watched) {
                    Some(list) => success(json!({"filtered_movies": list})),
                    None => error("movie_list must be a list of strings"),
                }
            }
            _ => error("unknown action"),
        }
    }
}

#[async_trait]
impl Transport for MemoryWatchedStatusService {
    fn endpoint(&self) -> &str {
        "memory://watched_status"
    }

    async fn round_trip(&mut self, request: String) -> Result<String, GatewayError> {
        let request = self.log.record(&request);
        Ok(self.handle(&request))
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
