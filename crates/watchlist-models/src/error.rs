use thiserror::Error;

/// Input rejected on the client before any remote call is attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("movie title cannot be blank")]
    BlankTitle,

    #[error("rating must be between 1 and 10, got {0}")]
    RatingOutOfRange(u8),
}
