use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchlistError {
    #[error("invalid index {index}: watchlist has {len} entries")]
    InvalidIndex { index: usize, len: usize },
}
