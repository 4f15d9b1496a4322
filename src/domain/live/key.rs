//! Session key value object.
//!
//! A key is the public, human-typeable code of a live session: exactly four
//! ASCII digits, so that a follower can type it into a phone.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Number of digits in a session key.
pub const KEY_LENGTH: usize = 4;

/// Size of the key space (`0000` through `9999`).
pub const KEY_SPACE: u16 = 10_000;

/// Public identifier of a live session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionKey(String);

impl SessionKey {
    /// Parses a key, accepting exactly four ASCII digits.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if Self::is_valid_format(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValidationError::invalid_format(
                "key",
                format!("expected {} digits, got {:?}", KEY_LENGTH, raw),
            ))
        }
    }

    /// Pure format check: true iff `raw` is exactly four ASCII digits.
    pub fn is_valid_format(raw: &str) -> bool {
        raw.len() == KEY_LENGTH && raw.bytes().all(|b| b.is_ascii_digit())
    }

    /// Builds the key for a numeric index, wrapping into the key space.
    pub fn from_index(index: u16) -> Self {
        Self(format!("{:04}", index % KEY_SPACE))
    }

    /// Draws a uniformly random key. Does not reserve it.
    pub fn random() -> Self {
        Self::from_index(rand::thread_rng().gen_range(0..KEY_SPACE))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionKey> for String {
    fn from(key: SessionKey) -> Self {
        key.0
    }
}
