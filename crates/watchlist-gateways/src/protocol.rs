//! Wire format shared by both services: one JSON object per request and per reply.
//!
//! Requests carry an `action` and the protocol `version`; successful replies carry
//! `"status": "success"` plus an action-specific payload.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use watchlist_models::Rating;
use crate::error::GatewayError;

pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    Save {
        items: Vec<String>,
    },
    Load,
    MarkWatched {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        rating: Option<Rating>,
        #[serde(skip_serializing_if = "Option::is_none")]
        watch_date: Option<NaiveDate>,
    },
    MarkUnwatched {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        rating: Option<Rating>,
        #[serde(skip_serializing_if = "Option::is_none")]
        watch_date: Option<NaiveDate>,
    },
    GetStatus {
        title: String,
    },
    GetAllMovies,
    GetUnwatchedFromList {
        movie_list: Vec<String>,
    },
    GetWatchedFromList {
        movie_list: Vec<String>,
    },
    FilterByStatus {
        movie_list: Vec<String>,
        watched: bool,
    },
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::Save { .. } => "save",
            Request::Load => "load",
            Request::MarkWatched { .. } => "mark_watched",
            Request::MarkUnwatched { .. } => "mark_unwatched",
            Request::GetStatus { .. } => "get_status",
            Request::GetAllMovies => "get_all_movies",
            Request::GetUnwatchedFromList { .. } => "get_unwatched_from_list",
            Request::GetWatchedFromList { .. } => "get_watched_from_list",
            Request::FilterByStatus { .. } => "filter_by_status",
        }
    }

    /// Serialize to the JSON object sent on the wire, stamped with `version`
    pub fn encode(&self, version: u32) -> Result<String, GatewayError> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(ref mut object) = value {
            object.insert("version".to_string(), Value::from(version));
        }
        Ok(serde_json::to_string(&value)?)
    }
}

/// A decoded reply whose `status` was `"success"`
#[derive(Debug, Clone, PartialEq)]
pub struct Reply(Map<String, Value>);

impl Reply {
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| GatewayError::MalformedReply(format!("not JSON: {}", e)))?;

        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(GatewayError::MalformedReply(format!(
                    "expected a JSON object, got {}",
                    json_type(&other)
                )))
            }
        };

        match object.get("status") {
            Some(Value::String(status)) if status == STATUS_SUCCESS => Ok(Self(object)),
            Some(Value::String(status)) => Err(GatewayError::Rejected(status.clone())),
            Some(other) => Err(GatewayError::MalformedReply(format!(
                "status must be a string, got {}",
                json_type(other)
            ))),
            None => Err(GatewayError::MalformedReply("missing status field".to_string())),
        }
    }

    /// Decode the action-specific fields of the reply
    pub fn payload<T: DeserializeOwned>(self) -> Result<T, GatewayError> {
        serde_json::from_value(Value::Object(self.0))
            .map_err(|e| GatewayError::MalformedReply(format!("unexpected payload: {}", e)))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn encoded(request: &Request) -> Value {
        serde_json::from_str(&request.encode(1).unwrap()).unwrap()
    }

    #[test]
    fn test_save_request_shape() {
        let request = Request::Save {
            items: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(
            encoded(&request),
            json!({"action": "save", "version": 1, "items": ["A", "B"]})
        );
    }

    #[test]
    fn test_unit_requests_carry_only_action_and_version() {
        assert_eq!(encoded(&Request::Load), json!({"action": "load", "version": 1}));
        assert_eq!(
            encoded(&Request::GetAllMovies),
            json!({"action": "get_all_movies", "version": 1})
        );
    }

    #[test]
    fn test_mark_watched_omits_absent_optionals() {
        let bare = Request::MarkWatched {
            title: "Heat".to_string(),
            rating: None,
            watch_date: None,
        };
        assert_eq!(
            encoded(&bare),
            json!({"action": "mark_watched", "version": 1, "title": "Heat"})
        );

        let full = Request::MarkWatched {
            title: "Heat".to_string(),
            rating: Some(Rating::new(9).unwrap()),
            watch_date: NaiveDate::from_ymd_opt(2024, 5, 17),
        };
        assert_eq!(
            encoded(&full),
            json!({
                "action": "mark_watched",
                "version": 1,
                "title": "Heat",
                "rating": 9,
                "watch_date": "2024-05-17"
            })
        );
    }

    #[test]
    fn test_filter_by_status_shape() {
        let request = Request::FilterByStatus {
            movie_list: vec!["Alien".to_string()],
            watched: false,
        };
        assert_eq!(request.action(), "filter_by_status");
        assert_eq!(
            encoded(&request),
            json!({"action": "filter_by_status", "version": 1, "movie_list": ["Alien"], "watched": false})
        );
    }

    #[test]
    fn test_reply_requires_success_status() {
        assert!(Reply::parse(r#"{"status": "success"}"#).is_ok());
        assert!(matches!(
            Reply::parse(r#"{"status": "error", "message": "boom"}"#),
            Err(GatewayError::Rejected(status)) if status == "error"
        ));
        assert!(matches!(
            Reply::parse(r#"{"items": []}"#),
            Err(GatewayError::MalformedReply(_))
        ));
        assert!(matches!(
            Reply::parse(r#"{"status": true}"#),
            Err(GatewayError::MalformedReply(_))
        ));
        assert!(matches!(Reply::parse("[1, 2]"), Err(GatewayError::MalformedReply(_))));
        assert!(matches!(Reply::parse("not json"), Err(GatewayError::MalformedReply(_))));
    }

    #[test]
    fn test_reply_payload_decoding() {
        #[derive(Deserialize)]
        struct Items {
            items: Vec<String>,
        }

        let reply = Reply::parse(r#"{"status": "success", "items": ["A"]}"#).unwrap();
        assert_eq!(reply.get("items"), Some(&json!(["A"])));
        let items: Items = reply.payload().unwrap();
        assert_eq!(items.items, vec!["A"]);

        let bad = Reply::parse(r#"{"status": "success", "items": "A"}"#).unwrap();
        assert!(matches!(bad.payload::<Items>(), Err(GatewayError::MalformedReply(_))));
    }
}
