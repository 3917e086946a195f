use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reply payload of a `get_status` query. The service owns these records;
/// the client only reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchStatus {
    #[serde(default)]
    pub watched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_date: Option<String>,
}

impl WatchStatus {
    /// The watch date, if the service sent one in `YYYY-MM-DD` form
    pub fn parsed_watch_date(&self) -> Option<NaiveDate> {
        parse_watch_date(self.watch_date.as_deref())
    }
}

/// One entry of a `get_all_movies` reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieStatus {
    pub title: String,
    #[serde(default)]
    pub watched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_date: Option<String>,
    /// Any further fields the service attaches, passed through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MovieStatus {
    pub fn parsed_watch_date(&self) -> Option<NaiveDate> {
        parse_watch_date(self.watch_date.as_deref())
    }
}

fn parse_watch_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}
