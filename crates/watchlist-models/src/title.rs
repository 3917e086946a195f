use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::ValidationError;

/// A canonical movie title: trimmed and title-cased, never blank.
///
/// Two titles refer to the same movie when they are equal ignoring case;
/// use [`MovieTitle::matches`] rather than `==` for watchlist lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MovieTitle(String);

impl MovieTitle {
    /// Trim and title-case raw user input
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        Ok(Self(title_case(trimmed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonicalize raw input the same way and compare ignoring case
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == title_case(other.trim()).to_lowercase()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Title-case a character when the character before it is uncased, lower-case it otherwise.
///
/// Anything without case (punctuation, digits, CJK) starts a new word:
/// `"they're"` becomes `"They'Re"` and `"日本abc"` becomes `"日本Abc"`.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_is_cased = false;

    for c in input.chars() {
        if previous_is_cased {
            out.extend(c.to_lowercase());
        } else {
            push_title_char(&mut out, c);
        }
        previous_is_cased = is_cased(c);
    }

    out
}

fn is_cased(c: char) -> bool {
    c.is_lowercase() || c.is_uppercase()
}

// Upper-case expansions keep only their first char upper: 'ß' -> "Ss"
fn push_title_char(out: &mut String, c: char) {
    let mut upper = c.to_uppercase();
    if let Some(first) = upper.next() {
        out.push(first);
    }
    for rest in upper {
        out.extend(rest.to_lowercase());
    }
}

impl TryFrom<String> for MovieTitle {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MovieTitle> for String {
    fn from(title: MovieTitle) -> Self {
        title.0
    }
}

impl AsRef<str> for MovieTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
