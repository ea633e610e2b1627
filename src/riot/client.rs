//! reqwest-backed [`RiotApi`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{Account, RiotApi, RiotError, SOLO_DUO_QUEUE};
use crate::config::RiotConfig;
use crate::models::{Puuid, RankEntry, RiotId};

const TOKEN_HEADER: &str = "X-Riot-Token";

/// Longest upstream error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountDto {
    puuid: String,
    game_name: String,
    tag_line: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummonerDto {
    #[serde(default)]
    profile_icon_id: Option<i64>,
    #[serde(default)]
    summoner_level: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeagueEntryDto {
    queue_type: String,
    tier: Option<String>,
    rank: Option<String>,
    #[serde(default)]
    league_points: u32,
    #[serde(default)]
    wins: u32,
    #[serde(default)]
    losses: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChampionMasteryDto {
    champion_id: i64,
}

/// HTTP client for the Riot API.
pub struct RiotClient {
    client: Client,
    account_base: Url,
    platform_base: Url,
}

impl RiotClient {
    pub fn new(config: &RiotConfig) -> Result<Self, RiotError> {
        let mut headers = HeaderMap::new();
        let mut token =
            HeaderValue::from_str(config.api_key.trim()).map_err(|_| RiotError::InvalidApiKey)?;
        token.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()?;

        let (account_base, platform_base) = match &config.base_url_override {
            Some(base) => (parse_base(base)?, parse_base(base)?),
            None => (
                parse_base(&format!("https://{}.api.riotgames.com", config.account_region))?,
                parse_base(&format!("https://{}.api.riotgames.com", config.platform_region))?,
            ),
        };

        Ok(Self {
            client,
            account_base,
            platform_base,
        })
    }

    /// Append percent-encoded path segments to a base URL.
    fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, RiotError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| RiotError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON resource. 404 maps to `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, RiotError> {
        let endpoint = url.path().to_string();
        debug!("GET {}", endpoint);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RiotError::Timeout {
                    endpoint: endpoint.clone(),
                }
            } else {
                RiotError::Http(e)
            }
        })?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => {
                debug!("Not found: {}", endpoint);
                return Ok(None);
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Riot rejected the API key for {}", endpoint);
                return Err(RiotError::Unauthorized { endpoint });
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60);
                return Err(RiotError::RateLimited {
                    endpoint,
                    retry_after_secs,
                });
            }
            _ => {}
        }

        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut body, MAX_ERROR_BODY);
            return Err(RiotError::Status {
                status: status.as_u16(),
                endpoint,
                body,
            });
        }

        let value = response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                RiotError::Timeout { endpoint }
            } else {
                RiotError::Http(e)
            }
        })?;
        Ok(Some(value))
    }
}

fn parse_base(s: &str) -> Result<Url, RiotError> {
    Url::parse(s).map_err(|e| RiotError::InvalidUrl(format!("{}: {}", s, e)))
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

/// Pick the solo/duo entry out of a league-v4 response.
fn solo_duo_entry(entries: Vec<LeagueEntryDto>) -> Option<RankEntry> {
    entries
        .into_iter()
        .find(|e| e.queue_type == SOLO_DUO_QUEUE)
        .map(|e| RankEntry {
            tier: e.tier.unwrap_or_else(|| crate::models::rank::UNRANKED.to_string()),
            division: e.rank.unwrap_or_default(),
            league_points: e.league_points,
            wins: e.wins,
            losses: e.losses,
        })
}

#[async_trait]
impl RiotApi for RiotClient {
    async fn resolve_account(&self, riot_id: &RiotId) -> Result<Option<Account>, RiotError> {
        let url = Self::endpoint(
            &self.account_base,
            &[
                "riot",
                "account",
                "v1",
                "accounts",
                "by-riot-id",
                &riot_id.game_name,
                &riot_id.tag_line,
            ],
        )?;

        let account: Option<AccountDto> = self.get_json(url).await?;
        Ok(account.map(|a| Account {
            puuid: Puuid::from(a.puuid),
            riot_id: RiotId::new(a.game_name, a.tag_line),
        }))
    }

    async fn fetch_profile_icon(&self, puuid: &Puuid) -> Result<Option<i64>, RiotError> {
        let url = Self::endpoint(
            &self.platform_base,
            &["lol", "summoner", "v4", "summoners", "by-puuid", puuid.as_str()],
        )?;

        let summoner: Option<SummonerDto> = self.get_json(url).await?;
        if let Some(s) = &summoner {
            debug!(
                %puuid,
                icon = ?s.profile_icon_id,
                level = ?s.summoner_level,
                "Summoner data received"
            );
        }
        Ok(summoner.and_then(|s| s.profile_icon_id))
    }

    async fn fetch_rank_entry(&self, puuid: &Puuid) -> Result<Option<RankEntry>, RiotError> {
        let url = Self::endpoint(
            &self.platform_base,
            &["lol", "league", "v4", "entries", "by-puuid", puuid.as_str()],
        )?;

        let entries: Option<Vec<LeagueEntryDto>> = self.get_json(url).await?;
        Ok(entries.and_then(solo_duo_entry))
    }

    async fn fetch_top_champions(
        &self,
        puuid: &Puuid,
        count: usize,
    ) -> Result<Vec<i64>, RiotError> {
        let mut url = Self::endpoint(
            &self.platform_base,
            &[
                "lol",
                "champion-mastery",
                "v4",
                "champion-masteries",
                "by-puuid",
                puuid.as_str(),
                "top",
            ],
        )?;
        url.query_pairs_mut()
            .append_pair("count", &count.to_string());

        let masteries: Option<Vec<ChampionMasteryDto>> = self.get_json(url).await?;
        Ok(masteries
            .unwrap_or_default()
            .into_iter()
            .take(count)
            .map(|m| m.champion_id)
            .collect())
    }
}
