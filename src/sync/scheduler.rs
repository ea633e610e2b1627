//! Background refresh loop.
//!
//! The scheduler starts in [`SchedulerPhase::Seeding`], reconciles the
//! configured seed roster once, then moves to
//! [`SchedulerPhase::SteadyLoop`] for the life of the process:
//!
//! ```text
//! loop { sleep(refresh_interval); for player in store { reconcile; sleep(request_delay) } }
//! ```
//!
//! Players are processed one at a time. The delay between players is
//! mandatory and is the only rate limiting applied to Riot.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::{Reconciler, SyncError};
use crate::models::RiotId;

/// Scheduler timing and roster.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub seed_players: Vec<RiotId>,
    pub refresh_interval: Duration,
    pub request_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            seed_players: Vec::new(),
            refresh_interval: Duration::from_secs(30 * 60),
            request_delay: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    #[default]
    Seeding,
    SteadyLoop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassKind {
    Seed,
    Refresh,
    Manual,
}

/// Outcome of one pass over a list of players.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub kind: PassKind,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
    /// Set when a credential failure stopped the pass early
    pub aborted: bool,
    pub errors: Vec<String>,
}

/// Observable scheduler state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub phase: SchedulerPhase,
    pub cycles_completed: u64,
    pub last_report: Option<CycleReport>,
    /// Last cycle-level failure (roster unreadable)
    pub last_error: Option<String>,
}

pub type SharedSchedulerStatus = Arc<RwLock<SchedulerStatus>>;

/// Owns the seed + refresh loop.
pub struct RefreshScheduler {
    reconciler: Arc<Reconciler>,
    config: SchedulerConfig,
    status: SharedSchedulerStatus,
}

impl RefreshScheduler {
    pub fn new(reconciler: Arc<Reconciler>, config: SchedulerConfig) -> Self {
        Self {
            reconciler,
            config,
            status: Arc::new(RwLock::new(SchedulerStatus::default())),
        }
    }

    /// Handle for readers (the HTTP status route).
    pub fn status(&self) -> SharedSchedulerStatus {
        self.status.clone()
    }

    /// Spawn [`run`](Self::run) on the tokio runtime.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Seed, then refresh forever.
    pub async fn run(self: Arc<Self>) {
        let report = self.seed().await;
        info!(
            "Seeding finished: {} ok, {} failed",
            report.succeeded, report.failed
        );

        self.status.write().await.phase = SchedulerPhase::SteadyLoop;
        info!(
            "Refreshing roster every {:?} ({:?} between players)",
            self.config.refresh_interval, self.config.request_delay
        );

        loop {
            tokio::time::sleep(self.config.refresh_interval).await;

            match self.refresh_cycle().await {
                Ok(report) => {
                    info!(
                        "Refresh cycle complete: {} ok, {} failed{}",
                        report.succeeded,
                        report.failed,
                        if report.aborted { " (aborted)" } else { "" }
                    );
                }
                Err(e) => {
                    error!("Refresh cycle failed: {}", e);
                }
            }
        }
    }

    /// Reconcile every configured seed player once.
    pub async fn seed(&self) -> CycleReport {
        info!("Seeding {} players", self.config.seed_players.len());
        self.run_pass(PassKind::Seed, &self.config.seed_players)
            .await
    }

    /// Reconcile every stored player once.
    pub async fn refresh_cycle(&self) -> Result<CycleReport, SyncError> {
        let roster = match self.reconciler.store().list().await {
            Ok(players) => players,
            Err(e) => {
                let err = SyncError::from(e);
                self.status.write().await.last_error = Some(err.to_string());
                return Err(err);
            }
        };

        let targets: Vec<RiotId> = roster.iter().map(|p| p.riot_id()).collect();
        info!("Refreshing {} players", targets.len());
        Ok(self.run_pass(PassKind::Refresh, &targets).await)
    }

    /// One pass over the seed roster plus every stored player.
    pub async fn sync_once(&self) -> Result<CycleReport, SyncError> {
        let roster = self.reconciler.store().list().await?;
        let targets = merge_targets(
            &self.config.seed_players,
            roster.iter().map(|p| p.riot_id()),
        );
        Ok(self.run_pass(PassKind::Manual, &targets).await)
    }

    async fn run_pass(&self, kind: PassKind, targets: &[RiotId]) -> CycleReport {
        let started_at = Utc::now();
        let mut report = CycleReport {
            kind,
            started_at,
            completed_at: started_at,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            aborted: false,
            errors: Vec::new(),
        };

        for (idx, riot_id) in targets.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.config.request_delay).await;
            }

            report.attempted += 1;
            match self.reconciler.reconcile(riot_id).await {
                Ok(player) => {
                    report.succeeded += 1;
                    info!(
                        "[{}/{}] {} updated ({} {} {} LP)",
                        idx + 1,
                        targets.len(),
                        player.riot_id(),
                        player.tier,
                        player.division,
                        player.league_points
                    );
                }
                Err(e) if e.is_fatal() => {
                    report.failed += 1;
                    report.aborted = true;
                    report.errors.push(format!("{}: {}", riot_id, e));
                    error!(player = %riot_id, "Aborting {:?} pass: {}", kind, e);
                    break;
                }
                Err(e) => {
                    report.failed += 1;
                    report.errors.push(format!("{}: {}", riot_id, e));
                    warn!(player = %riot_id, "[{}/{}] Failed: {}", idx + 1, targets.len(), e);
                }
            }
        }

        report.completed_at = Utc::now();

        {
            let mut status = self.status.write().await;
            if kind == PassKind::Refresh {
                status.cycles_completed += 1;
                status.last_error = None;
            }
            status.last_report = Some(report.clone());
        }

        report
    }
}

/// Seed players first, then stored players not already listed.
fn merge_targets<I>(seed: &[RiotId], stored: I) -> Vec<RiotId>
where
    I: IntoIterator<Item = RiotId>,
{
    let mut seen = HashSet::new();
    seed.iter()
        .cloned()
        .chain(stored)
        .filter(|id| seen.insert(id.to_string().to_lowercase()))
        .collect()
}
