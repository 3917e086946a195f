pub mod config;
pub mod paths;

pub use config::{
    ChannelConfig, Config, LoggingConfig, ServiceConfig, DEFAULT_PERSISTENCE_ENDPOINT,
    DEFAULT_PROTOCOL_VERSION, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_WATCHED_STATUS_ENDPOINT,
};
pub use paths::{container_base_path, PathManager};
