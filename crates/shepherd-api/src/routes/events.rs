//! Build-state-change event endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use shepherd_core::events::BuildStateChange;
use shepherd_workflow::RelayOutcome;

use crate::AppState;
use crate::activation::Activation;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new().route("/build-state", post(build_state_change))
}

/// Publish the commit status for a build-state change.
async fn build_state_change(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RelayOutcome>, ApiError> {
    let event = BuildStateChange::from_json(&body)?;
    let activation = Activation::start(&state.config, &state.backends).await?;
    Ok(Json(activation.relay(&event).await?))
}
