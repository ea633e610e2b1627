//! Ranked ladder model and score normalization.
//!
//! Riot reports a player's standing as a tier ("GOLD"), a division ("II")
//! and league points. [`sort_score`] folds the three into one integer so the
//! whole roster can be ordered with a single comparison:
//!
//! ```text
//! score = tier_base + division_offset + league_points
//! ```
//!
//! Tier bases are 1000 apart and division offsets 100 apart, so a division
//! always outranks the one below it for league points in `0..=100`, and an
//! unranked player sits below every ranked player.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tier string stored for players without a solo/duo entry.
pub const UNRANKED: &str = "UNRANKED";

/// Ranked tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Unranked,
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    pub const ALL: [Tier; 11] = [
        Tier::Unranked,
        Tier::Iron,
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Emerald,
        Tier::Diamond,
        Tier::Master,
        Tier::Grandmaster,
        Tier::Challenger,
    ];

    /// Parse an upstream tier string. Unknown strings yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let tier = match s.trim().to_ascii_uppercase().as_str() {
            "UNRANKED" => Tier::Unranked,
            "IRON" => Tier::Iron,
            "BRONZE" => Tier::Bronze,
            "SILVER" => Tier::Silver,
            "GOLD" => Tier::Gold,
            "PLATINUM" => Tier::Platinum,
            "EMERALD" => Tier::Emerald,
            "DIAMOND" => Tier::Diamond,
            "MASTER" => Tier::Master,
            "GRANDMASTER" => Tier::Grandmaster,
            "CHALLENGER" => Tier::Challenger,
            _ => return None,
        };
        Some(tier)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Unranked => UNRANKED,
            Tier::Iron => "IRON",
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
            Tier::Emerald => "EMERALD",
            Tier::Diamond => "DIAMOND",
            Tier::Master => "MASTER",
            Tier::Grandmaster => "GRANDMASTER",
            Tier::Challenger => "CHALLENGER",
        }
    }

    /// Base score for the tier.
    pub fn base_score(&self) -> i64 {
        match self {
            Tier::Unranked => -1000,
            Tier::Iron => 0,
            Tier::Bronze => 1000,
            Tier::Silver => 2000,
            Tier::Gold => 3000,
            Tier::Platinum => 4000,
            Tier::Emerald => 5000,
            Tier::Diamond => 6000,
            Tier::Master => 7000,
            Tier::Grandmaster => 8000,
            Tier::Challenger => 9000,
        }
    }

    /// Apex tiers have a single league with no divisions.
    pub fn is_apex(&self) -> bool {
        matches!(self, Tier::Master | Tier::Grandmaster | Tier::Challenger)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Divisions inside a non-apex tier. `I` is the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Division {
    IV,
    III,
    II,
    I,
}

impl Division {
    pub const ALL: [Division; 4] = [Division::IV, Division::III, Division::II, Division::I];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I" => Some(Division::I),
            "II" => Some(Division::II),
            "III" => Some(Division::III),
            "IV" => Some(Division::IV),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Division::I => "I",
            Division::II => "II",
            Division::III => "III",
            Division::IV => "IV",
        }
    }

    pub fn offset(&self) -> i64 {
        match self {
            Division::I => 300,
            Division::II => 200,
            Division::III => 100,
            Division::IV => 0,
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the ladder score for raw upstream strings.
///
/// Unrecognized tiers and divisions contribute 0, so an unknown tier scores
/// exactly like IRON with the same division and LP. It can tie Iron but
/// never outranks BRONZE or above.
pub fn sort_score(tier: &str, division: &str, league_points: u32) -> i64 {
    let base = Tier::parse(tier).map(|t| t.base_score()).unwrap_or(0);
    let offset = Division::parse(division).map(|d| d.offset()).unwrap_or(0);
    base + offset + i64::from(league_points)
}
