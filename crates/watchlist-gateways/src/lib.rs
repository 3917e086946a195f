pub mod channel;
pub mod connection;
pub mod error;
pub mod health;
pub mod outcome;
pub mod persistence;
pub mod protocol;
pub mod transport;
pub mod watched_status;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use channel::{ChannelContext, RequestChannel};
pub use connection::ServiceConnection;
pub use error::GatewayError;
pub use health::ServiceHealth;
pub use outcome::Outcome;
pub use persistence::PersistenceGateway;
pub use protocol::{Reply, Request};
pub use transport::{Transport, ZmqTransport};
pub use watched_status::WatchedStatusGateway;
