use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::ValidationError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

/// A user rating on the 1-10 integer scale the watched-status service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::RatingOutOfRange(value))
        }
    }

    /// Validate an optional rating, keeping `None` as "no rating given"
    pub fn from_optional(value: Option<u8>) -> Result<Option<Self>, ValidationError> {
        value.map(Self::new).transpose()
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/10", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(10).is_ok());
        assert_eq!(Rating::new(0), Err(ValidationError::RatingOutOfRange(0)));
        assert_eq!(Rating::new(11), Err(ValidationError::RatingOutOfRange(11)));
    }

    #[test]
    fn test_optional_rating() {
        assert_eq!(Rating::from_optional(None), Ok(None));
        assert_eq!(Rating::from_optional(Some(7)).unwrap().map(Rating::value), Some(7));
        assert!(Rating::from_optional(Some(42)).is_err());
    }

    #[test]
    fn test_rating_serializes_as_plain_integer() {
        let rating = Rating::new(8).unwrap();
        assert_eq!(serde_json::to_string(&rating).unwrap(), "8");
        assert!(serde_json::from_str::<Rating>("11").is_err());
    }
}
