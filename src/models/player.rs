//! Tracked player model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rank::{sort_score, UNRANKED};
use super::{Puuid, RiotId};

/// Icon shown when the summoner lookup has nothing (the basic minion).
pub const DEFAULT_PROFILE_ICON: i64 = 29;

/// Solo/duo standing as reported by the league endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub tier: String,
    pub division: String,
    pub league_points: u32,
    pub wins: u32,
    pub losses: u32,
}

impl RankEntry {
    /// Entry used when the player has no solo/duo placement.
    pub fn unranked() -> Self {
        Self {
            tier: UNRANKED.to_string(),
            division: String::new(),
            league_points: 0,
            wins: 0,
            losses: 0,
        }
    }
}

impl Default for RankEntry {
    fn default() -> Self {
        Self::unranked()
    }
}

/// Everything one reconciliation learns about a player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub puuid: Puuid,
    pub riot_id: RiotId,
    pub profile_icon_id: i64,
    pub rank: RankEntry,
    pub top_champions: Vec<i64>,
}

/// One row of the ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub puuid: Puuid,
    pub game_name: String,
    pub tag_line: String,
    pub tier: String,
    #[serde(rename = "rank")]
    pub division: String,
    #[serde(rename = "lp")]
    pub league_points: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub profile_icon_id: i64,
    #[serde(default)]
    pub top_champions: Vec<i64>,
    pub sort_score: i64,
    /// League points at the first positive observation; never changes afterwards.
    #[serde(rename = "initial_lp", default)]
    pub initial_league_points: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Build a new row from a first successful reconciliation.
    pub fn from_snapshot(snapshot: PlayerSnapshot, now: DateTime<Utc>) -> Self {
        let mut player = Self {
            puuid: snapshot.puuid.clone(),
            game_name: String::new(),
            tag_line: String::new(),
            tier: UNRANKED.to_string(),
            division: String::new(),
            league_points: 0,
            wins: 0,
            losses: 0,
            win_rate: 0.0,
            profile_icon_id: DEFAULT_PROFILE_ICON,
            top_champions: Vec::new(),
            sort_score: sort_score(UNRANKED, "", 0),
            initial_league_points: 0,
            created_at: now,
            updated_at: now,
        };
        player.apply(snapshot, now);
        player
    }

    /// Overwrite every mutable field from a snapshot.
    ///
    /// `puuid` and `created_at` are kept; `initial_league_points` is only set
    /// while still 0 and the new league points are positive.
    pub fn apply(&mut self, snapshot: PlayerSnapshot, now: DateTime<Utc>) {
        debug_assert_eq!(self.puuid, snapshot.puuid);

        let rank = snapshot.rank;
        self.game_name = snapshot.riot_id.game_name;
        self.tag_line = snapshot.riot_id.tag_line;
        self.win_rate = win_rate(rank.wins, rank.losses);
        self.sort_score = sort_score(&rank.tier, &rank.division, rank.league_points);
        if self.initial_league_points == 0 && rank.league_points > 0 {
            self.initial_league_points = rank.league_points;
        }
        self.tier = rank.tier;
        self.division = rank.division;
        self.league_points = rank.league_points;
        self.wins = rank.wins;
        self.losses = rank.losses;
        self.profile_icon_id = snapshot.profile_icon_id;
        self.top_champions = snapshot.top_champions;
        self.updated_at = now;
    }

    pub fn riot_id(&self) -> RiotId {
        RiotId::new(self.game_name.clone(), self.tag_line.clone())
    }

    /// The stored solo/duo standing.
    pub fn rank_entry(&self) -> RankEntry {
        RankEntry {
            tier: self.tier.clone(),
            division: self.division.clone(),
            league_points: self.league_points,
            wins: self.wins,
            losses: self.losses,
        }
    }
}

/// Win percentage rounded to one decimal, or 0.0 with no games played.
pub fn win_rate(wins: u32, losses: u32) -> f64 {
    let total = u64::from(wins) + u64::from(losses);
    if total == 0 {
        return 0.0;
    }
    let pct = f64::from(wins) / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Order players for the leaderboard: score descending, then name, then PUUID.
pub fn sort_ladder(players: &mut [Player]) {
    players.sort_by(|a, b| {
        b.sort_score
            .cmp(&a.sort_score)
            .then_with(|| {
                a.game_name
                    .to_lowercase()
                    .cmp(&b.game_name.to_lowercase())
            })
            .then_with(|| a.puuid.cmp(&b.puuid))
    });
}
