use axum::{extract::State, routing::get, Json, Router};
use context_engine::CacheStats;
use tracing::{info, instrument};

use crate::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(cache_stats).delete(clear_cache))
}

#[instrument(name = "GET /admin/context-cache", skip(app_state))]
async fn cache_stats(State(app_state): State<AppState>) -> Json<CacheStats> {
    Json(app_state.engine().cache().stats())
}

#[instrument(name = "DELETE /admin/context-cache", skip(app_state))]
async fn clear_cache(State(app_state): State<AppState>) -> Json<CacheStats> {
    let cleared = app_state.engine().cache().clear();
    info!(
        blacklisted_prefixes = cleared.blacklisted_prefixes,
        pmi_vectors = cleared.pmi_vectors,
        term_frequency_tables = cleared.term_frequency_tables,
        "Cleared context cache"
    );
    Json(cleared)
}
