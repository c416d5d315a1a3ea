use axum::{extract::State, response::IntoResponse, Json};

use crate::{blockchain::chains, AppState};

// The handler function for the GET /chains endpoint.
pub async fn list_chains_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(chains::list_chains(&state.config.chain_overrides))
}
