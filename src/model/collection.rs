use std::fmt;
use thiserror::Error;

pub const METADATA_COLLECTION: &str = "metadata";
pub const DUPLICATION_COLLECTION: &str = "duplication";

/// Postgres truncates identifiers beyond this many bytes
const MAX_COLLECTION_NAME_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionNameError {
    #[error("collection name must not be empty")]
    Empty,
    #[error("collection name '{0}' is longer than 63 bytes")]
    TooLong(String),
    #[error("collection name '{name}' contains invalid character {found:?}")]
    InvalidCharacter { name: String, found: char },
}

/// Validated collection identifier.
///
/// Lowercase ASCII letters, digits and `_`, not starting with a digit. The
/// name is used verbatim as a table name, so nothing outside that set is
/// accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionName(String);

impl CollectionName {
    pub fn new(name: &str) -> Result<Self, CollectionNameError> {
        if name.is_empty() {
            return Err(CollectionNameError::Empty);
        }
        if name.len() > MAX_COLLECTION_NAME_LEN {
            return Err(CollectionNameError::TooLong(name.to_string()));
        }

        for (i, c) in name.chars().enumerate() {
            let allowed = match c {
                'a'..='z' | '_' => true,
                '0'..='9' => i > 0,
                _ => false,
            };
            if !allowed {
                return Err(CollectionNameError::InvalidCharacter {
                    name: name.to_string(),
                    found: c,
                });
            }
        }

        Ok(Self(name.to_string()))
    }

    pub fn metadata() -> Self {
        Self(METADATA_COLLECTION.to_string())
    }

    pub fn duplication() -> Self {
        Self(DUPLICATION_COLLECTION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CollectionName {
    type Err = CollectionNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
