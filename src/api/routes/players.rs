use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Player, RiotId};

#[derive(Debug, Deserialize)]
pub struct AddPlayerRequest {
    pub game_name: String,
    pub tag_line: String,
}

impl AddPlayerRequest {
    fn riot_id(&self) -> Result<RiotId, ApiError> {
        let game_name = self.game_name.trim();
        let tag_line = self.tag_line.trim();
        if game_name.is_empty() {
            return Err(ApiError::BadRequest("game_name is required".to_string()));
        }
        if tag_line.is_empty() {
            return Err(ApiError::BadRequest("tag_line is required".to_string()));
        }
        Ok(RiotId::new(game_name, tag_line))
    }
}

/// POST /api/players
///
/// Reconciles the player synchronously and returns the stored row.
pub async fn add_player(
    State(state): State<AppState>,
    Json(body): Json<AddPlayerRequest>,
) -> Result<Json<Player>, ApiError> {
    let riot_id = body.riot_id()?;
    let player = state.reconciler.reconcile(&riot_id).await?;
    info!("Added {} ({} {})", player.riot_id(), player.tier, player.division);
    Ok(Json(player))
}
