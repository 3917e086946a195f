pub mod error;
pub mod store;

pub use error::WatchlistError;
pub use store::{AddOutcome, RemoveOutcome, WatchlistStore};
