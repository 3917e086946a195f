use watchlist_models::ValidationError;

/// Result of an operation that may touch a remote service.
///
/// `Unavailable` covers every remote failure (unreachable, timed out, garbage reply)
/// as well as a service that failed its startup probe. `Invalid` means the input was
/// rejected locally and no request was sent.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Outcome<T> {
    Success(T),
    Unavailable,
    Invalid(ValidationError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Unavailable | Outcome::Invalid(_) => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Unavailable => Outcome::Unavailable,
            Outcome::Invalid(err) => Outcome::Invalid(err),
        }
    }
}

impl<T> From<ValidationError> for Outcome<T> {
    fn from(err: ValidationError) -> Self {
        Outcome::Invalid(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        assert!(Outcome::Success(3).is_success());
        assert_eq!(Outcome::Success(3).map(|n| n * 2).success(), Some(6));
        assert_eq!(Outcome::<u8>::Unavailable.success(), None);

        let invalid: Outcome<()> = ValidationError::BlankTitle.into();
        assert_eq!(invalid, Outcome::Invalid(ValidationError::BlankTitle));
        assert!(!invalid.is_success());
    }
}
