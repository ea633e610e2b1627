//! Ladder synchronization.
//!
//! - [`Reconciler`]: fetch → normalize → upsert for one player
//! - [`RefreshScheduler`]: seeds the roster, then refreshes every stored
//!   player on a fixed cadence

mod reconcile;
mod scheduler;

pub use reconcile::{FieldOutcome, ReconcileError, Reconciler};
pub use scheduler::{
    CycleReport, PassKind, RefreshScheduler, SchedulerConfig, SchedulerPhase, SchedulerStatus,
    SharedSchedulerStatus,
};

use thiserror::Error;

/// Errors that abort a whole refresh cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to read roster: {0}")]
    Storage(#[from] crate::storage::StorageError),
}
