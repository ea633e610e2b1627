use std::sync::Arc;

use crate::storage::PlayerStore;
use crate::sync::{Reconciler, SharedSchedulerStatus};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PlayerStore>,
    pub reconciler: Arc<Reconciler>,
    pub scheduler_status: SharedSchedulerStatus,
    pub cors_origin: String,
}
