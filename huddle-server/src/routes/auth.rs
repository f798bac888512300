//! Authentication endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use huddle_core::Identity;
use huddle_core::provider::Provider;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/{provider}", post(sign_in))
}

/// POST /auth/:provider - Run the provider's interactive sign-in flow.
///
/// On the first sign-in of a new identity this also creates the user
/// profile document.
async fn sign_in(
    State(state): State<AppState>,
    Path(provider_name): Path<String>,
) -> Result<Json<Identity>, AppError> {
    let provider = Provider::from_name(&provider_name);
    let identity = state.auth.sign_in(&provider).await?;
    Ok(Json(identity))
}

/// GET /auth/me - The current identity, 401 when signed out.
async fn me(State(state): State<AppState>) -> Result<Json<Identity>, AppError> {
    Ok(Json(state.viewer()?))
}

/// POST /auth/sign-out - Clear the session.
async fn sign_out(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.auth.sign_out();
    Json(serde_json::json!({ "signedOut": true }))
}
