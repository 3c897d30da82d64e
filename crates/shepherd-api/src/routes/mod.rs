//! API routes.

pub mod events;
pub mod health;
pub mod webhooks;

use axum::Router;

use crate::AppState;

/// Build the main API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/webhooks", webhooks::router())
        .nest("/events", events::router())
        .merge(health::router())
        .with_state(state)
}
