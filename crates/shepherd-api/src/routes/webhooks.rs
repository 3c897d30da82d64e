//! GitHub webhook endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use shepherd_core::repository::PushEvent;
use tracing::{info, warn};

use crate::AppState;
use crate::activation::Activation;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new().route("/github", post(github_webhook))
}

/// Handle GitHub webhook events.
async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let event_type = headers
        .get("X-GitHub-Event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let delivery = headers
        .get("X-GitHub-Delivery")
        .and_then(|v| v.to_str().ok());

    if let Some(ref secret) = state.config.webhook_secret {
        let signature = headers
            .get("X-Hub-Signature-256")
            .and_then(|v| v.to_str().ok());

        if !verify_github_signature(secret, &body, signature) {
            warn!(event = %event_type, delivery = ?delivery, "Invalid webhook signature");
            return Err(ApiError::Unauthorized("invalid signature".to_string()));
        }
    }

    info!(event = %event_type, delivery = ?delivery, "Received GitHub webhook");

    match event_type {
        "ping" => {
            info!("Ping event received - webhook is configured correctly");
            Ok((StatusCode::OK, Json(json!({ "status": "pong" }))).into_response())
        }
        "push" => {
            let payload: serde_json::Value = serde_json::from_slice(&body)
                .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e)))?;
            let push = PushEvent::from_github_payload(&payload).ok_or_else(|| {
                ApiError::BadRequest("push payload lacks repository or commit".to_string())
            })?;

            let activation = Activation::start(&state.config, &state.backends).await?;
            let outcome = activation.trigger(&push).await?;
            Ok((StatusCode::OK, Json(outcome)).into_response())
        }
        _ => {
            info!(event = %event_type, "Unhandled event type");
            Ok(StatusCode::ACCEPTED.into_response())
        }
    }
}

/// Verify GitHub webhook signature.
fn verify_github_signature(secret: &str, body: &[u8], signature: Option<&str>) -> bool {
    let Some(signature) = signature else {
        return false;
    };

    // Signature format: "sha256=<hex>"
    let Some(sig_hex) = signature.strip_prefix("sha256=") else {
        return false;
    };

    let Ok(sig_bytes) = hex::decode(sig_hex) else {
        return false;
    };

    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);

    mac.verify_slice(&sig_bytes).is_ok()
}
