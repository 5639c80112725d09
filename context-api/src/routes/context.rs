use axum::{extract::State, routing::get, Json, Router};
use axum_extra::extract::Query;
use context_engine::{ContextParams, ContextResponse};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{app_state::AppState, routes::ApiError};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(context))
}

/// `{}` when the request was a no-op.
#[derive(Debug, Serialize)]
struct ContextBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ContextResponse>,
}

#[instrument(name = "GET /context", skip(app_state))]
async fn context(
    State(app_state): State<AppState>,
    Query(params): Query<ContextParams>,
) -> Result<Json<ContextBody>, ApiError> {
    let Some(request) = params.into_request() else {
        return Ok(Json(ContextBody { result: None }));
    };

    let response = app_state
        .run(move |engine| engine.handle(&request))
        .await??;
    debug!("Context request handled");

    Ok(Json(ContextBody {
        result: Some(response),
    }))
}
