pub mod error;
pub mod rating;
pub mod title;
pub mod watch_status;

pub use error::ValidationError;
pub use rating::Rating;
pub use title::{title_case, MovieTitle};
pub use watch_status::{MovieStatus, WatchStatus};
