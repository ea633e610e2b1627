use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::Player;

/// GET /api/ranking
///
/// Every stored player, highest `sort_score` first.
pub async fn get_ranking(State(state): State<AppState>) -> Result<Json<Vec<Player>>, ApiError> {
    let players = state
        .store
        .list()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(players))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use tempfile::TempDir;

    use crate::api::build_router;
    use crate::api::test_support::{get_json, setup_test_state};
    use crate::models::RiotId;
    use crate::riot::mock::{rank, MockRiotApi};

    #[tokio::test]
    async fn test_empty_ranking() {
        let dir = TempDir::new().unwrap();
        let state = setup_test_state(&dir, Arc::new(MockRiotApi::new()));

        let (status, json) = get_json(build_router(state), "/api/ranking").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_ranking_sorted_descending() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(
            MockRiotApi::new()
                .with_player("Iron", "1", "p-iron", rank("IRON", "IV", 10, 1, 9))
                .with_player("Master", "2", "p-master", rank("MASTER", "I", 120, 50, 40))
                .with_player("Gold", "3", "p-gold", rank("GOLD", "I", 99, 20, 20))
                .with_player("Emerald", "4", "p-emerald", rank("EMERALD", "IV", 0, 5, 5)),
        );
        let state = setup_test_state(&dir, api);
        for (name, tag) in [("Iron", "1"), ("Master", "2"), ("Gold", "3"), ("Emerald", "4")] {
            state
                .reconciler
                .reconcile(&RiotId::new(name, tag))
                .await
                .unwrap();
        }

        let (status, json) = get_json(build_router(state), "/api/ranking").await;
        assert_eq!(status, StatusCode::OK);

        let rows = json.as_array().unwrap();
        let names: Vec<&str> = rows
            .iter()
            .map(|r| r["game_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Master", "Emerald", "Gold", "Iron"]);

        let scores: Vec<i64> = rows
            .iter()
            .map(|r| r["sort_score"].as_i64().unwrap())
            .collect();
        assert!(scores.windows(2).all(|w| w[0] > w[1]));
    }

    #[tokio::test]
    async fn test_ranking_row_shape() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockRiotApi::new().with_player(
            "Naju",
            "Anaju",
            "p-naju",
            rank("PLATINUM", "III", 55, 7, 3),
        ));
        let state = setup_test_state(&dir, api);
        state
            .reconciler
            .reconcile(&RiotId::new("Naju", "Anaju"))
            .await
            .unwrap();

        let (_, json) = get_json(build_router(state), "/api/ranking").await;
        let row = &json[0];

        assert_eq!(row["tag_line"], "Anaju");
        assert_eq!(row["rank"], "III");
        assert_eq!(row["lp"], 55);
        assert_eq!(row["initial_lp"], 55);
        assert_eq!(row["wins"], 7);
        assert_eq!(row["losses"], 3);
        assert_eq!(row["profile_icon_id"], 1000);
        assert_eq!(row["top_champions"], serde_json::json!([1, 2, 3]));
    }
}
