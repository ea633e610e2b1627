//! In-memory [`RiotApi`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Account, RiotApi, RiotError};
use crate::models::{Puuid, RankEntry, RiotId};

/// Scripted answer for one lookup.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Missing,
    /// Fail with this HTTP status (401/403 become `Unauthorized`)
    Status(u16),
}

impl<T: Clone> Reply<T> {
    fn resolve(&self, endpoint: &str) -> Result<Option<T>, RiotError> {
        match self {
            Reply::Ok(v) => Ok(Some(v.clone())),
            Reply::Missing => Ok(None),
            Reply::Status(401) | Reply::Status(403) => Err(RiotError::Unauthorized {
                endpoint: endpoint.to_string(),
            }),
            Reply::Status(status) => Err(RiotError::Status {
                status: *status,
                endpoint: endpoint.to_string(),
                body: "mock failure".to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct MockData {
    accounts: HashMap<String, Reply<Account>>,
    icons: HashMap<Puuid, Reply<i64>>,
    ranks: HashMap<Puuid, Reply<RankEntry>>,
    champions: HashMap<Puuid, Reply<Vec<i64>>>,
}

/// Riot double. Unknown accounts resolve as not found and unknown PUUIDs
/// as missing sub-resources.
#[derive(Default)]
pub struct MockRiotApi {
    data: Mutex<MockData>,
    calls: AtomicUsize,
}

fn account_key(riot_id: &RiotId) -> String {
    format!(
        "{}#{}",
        riot_id.game_name.to_lowercase(),
        riot_id.tag_line.to_lowercase()
    )
}

impl MockRiotApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ranked player with every lookup succeeding.
    pub fn with_player(self, name: &str, tag: &str, puuid: &str, rank: RankEntry) -> Self {
        let puuid = Puuid::from(puuid);
        self.set_account(
            &RiotId::new(name, tag),
            Reply::Ok(Account {
                puuid: puuid.clone(),
                riot_id: RiotId::new(name, tag),
            }),
        );
        self.set_icon(&puuid, Reply::Ok(1000));
        self.set_rank(&puuid, Reply::Ok(rank));
        self.set_champions(&puuid, Reply::Ok(vec![1, 2, 3]));
        self
    }

    pub fn set_account(&self, riot_id: &RiotId, reply: Reply<Account>) {
        self.data
            .lock()
            .unwrap()
            .accounts
            .insert(account_key(riot_id), reply);
    }

    pub fn set_icon(&self, puuid: &Puuid, reply: Reply<i64>) {
        self.data.lock().unwrap().icons.insert(puuid.clone(), reply);
    }

    pub fn set_rank(&self, puuid: &Puuid, reply: Reply<RankEntry>) {
        self.data.lock().unwrap().ranks.insert(puuid.clone(), reply);
    }

    pub fn set_champions(&self, puuid: &Puuid, reply: Reply<Vec<i64>>) {
        self.data
            .lock()
            .unwrap()
            .champions
            .insert(puuid.clone(), reply);
    }

    /// Total lookups served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Ranked entry shorthand for tests.
pub fn rank(tier: &str, division: &str, lp: u32, wins: u32, losses: u32) -> RankEntry {
    RankEntry {
        tier: tier.to_string(),
        division: division.to_string(),
        league_points: lp,
        wins,
        losses,
    }
}

#[async_trait]
impl RiotApi for MockRiotApi {
    async fn resolve_account(&self, riot_id: &RiotId) -> Result<Option<Account>, RiotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let data = self.data.lock().unwrap();
        match data.accounts.get(&account_key(riot_id)) {
            Some(reply) => reply.resolve("/riot/account/v1/accounts/by-riot-id"),
            None => Ok(None),
        }
    }

    async fn fetch_profile_icon(&self, puuid: &Puuid) -> Result<Option<i64>, RiotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let data = self.data.lock().unwrap();
        match data.icons.get(puuid) {
            Some(reply) => reply.resolve("/lol/summoner/v4/summoners/by-puuid"),
            None => Ok(None),
        }
    }

    async fn fetch_rank_entry(&self, puuid: &Puuid) -> Result<Option<RankEntry>, RiotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let data = self.data.lock().unwrap();
        match data.ranks.get(puuid) {
            Some(reply) => reply.resolve("/lol/league/v4/entries/by-puuid"),
            None => Ok(None),
        }
    }

    async fn fetch_top_champions(
        &self,
        puuid: &Puuid,
        count: usize,
    ) -> Result<Vec<i64>, RiotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let data = self.data.lock().unwrap();
        match data.champions.get(puuid) {
            Some(reply) => Ok(reply
                .resolve("/lol/champion-mastery/v4/champion-masteries/by-puuid")?
                .unwrap_or_default()
                .into_iter()
                .take(count)
                .collect()),
            None => Ok(Vec::new()),
        }
    }
}
