//! Player identifiers: the stable upstream PUUID and the human-readable Riot ID.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stable per-account identifier issued by Riot, independent of display name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Puuid(String);

impl Puuid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the PUUID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Puuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Puuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Puuid({})", self.0)
    }
}

impl From<String> for Puuid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Puuid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid Riot ID '{0}' (expected Name#Tag)")]
pub struct RiotIdParseError(pub String);

/// A `game_name#tag_line` pair as typed by players.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiotId {
    pub game_name: String,
    pub tag_line: String,
}

impl RiotId {
    pub fn new(game_name: impl Into<String>, tag_line: impl Into<String>) -> Self {
        Self {
            game_name: game_name.into(),
            tag_line: tag_line.into(),
        }
    }
}

impl fmt::Display for RiotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tag_line)
    }
}

impl FromStr for RiotId {
    type Err = RiotIdParseError;

    /// Game names may contain spaces; the tag is everything after the last `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, tag) = s
            .trim()
            .rsplit_once('#')
            .ok_or_else(|| RiotIdParseError(s.to_string()))?;
        let (name, tag) = (name.trim(), tag.trim());
        if name.is_empty() || tag.is_empty() {
            return Err(RiotIdParseError(s.to_string()));
        }
        Ok(Self::new(name, tag))
    }
}
