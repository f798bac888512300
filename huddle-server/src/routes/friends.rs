//! Friends endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use huddle_core::{FriendEdge, FriendRequest, HuddleError, UserProfile};
use huddle_lib::friends::Friends;
use huddle_lib::store::paths;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/friends", get(list_friends))
        .route("/friends/search", post(search))
        .route("/friends/requests", get(list_requests))
        .route("/friends/requests", post(send_request))
        .route("/friends/requests/{id}/accept", post(accept_request))
        .route("/friends/requests/{id}/reject", post(reject_request))
        .route("/friends/requests/{id}/cancel", post(cancel_request))
        .route("/friends/{uid}", delete(remove_friend))
}

fn friends_for(state: &AppState) -> Result<Friends, AppError> {
    let viewer = state.viewer()?;
    Ok(Friends::new(state.store.clone(), viewer))
}

/// A friend as returned by the API
#[derive(Serialize)]
pub struct FriendInfo {
    pub uid: String,
    #[serde(flatten)]
    pub edge: FriendEdge,
    pub label: String,
}

/// GET /friends - The viewer's friend list
async fn list_friends(State(state): State<AppState>) -> Result<Json<Vec<FriendInfo>>, AppError> {
    let friends = friends_for(&state)?;

    let list = friends
        .list()
        .await
        .into_iter()
        .map(|friend| FriendInfo {
            uid: friend.uid,
            label: friend.edge.display_name().to_string(),
            edge: friend.edge,
        })
        .collect();

    Ok(Json(list))
}

/// Request body for user search
#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// POST /friends/search - Exact-match user search by email or display name
async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let friends = friends_for(&state)?;
    Ok(Json(friends.search(&req.query).await?))
}

/// One pending request as returned by the API
#[derive(Serialize)]
pub struct RequestInfo {
    pub id: String,
    #[serde(flatten)]
    pub request: FriendRequest,
}

#[derive(Serialize)]
pub struct RequestsResponse {
    pub incoming: Vec<RequestInfo>,
    pub outgoing: Vec<RequestInfo>,
}

/// GET /friends/requests - Incoming and outgoing pending requests
async fn list_requests(
    State(state): State<AppState>,
) -> Result<Json<RequestsResponse>, AppError> {
    let friends = friends_for(&state)?;

    let into_info = |pending: huddle_lib::friends::PendingRequest| RequestInfo {
        id: pending.id,
        request: pending.request,
    };

    Ok(Json(RequestsResponse {
        incoming: friends.incoming().await.into_iter().map(into_info).collect(),
        outgoing: friends.outgoing().await.into_iter().map(into_info).collect(),
    }))
}

/// Request body for sending a friend request
#[derive(Deserialize)]
pub struct SendRequest {
    pub uid: String,
}

/// POST /friends/requests - Send a friend request to a user by uid
async fn send_request(
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let friends = friends_for(&state)?;

    let target: UserProfile = state
        .store
        .get(paths::USERS, &req.uid)
        .await
        .ok_or_else(|| HuddleError::NotFound(format!("users/{}", req.uid)))?
        .parse()?;

    let id = friends.send_request(&target).await?;
    Ok(Json(serde_json::json!({ "id": id })))
}

/// POST /friends/requests/:id/accept - Accept an incoming request
async fn accept_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let friends = friends_for(&state)?;
    let pending = friends.request(&id).await?;
    friends.accept_request(&pending).await?;
    Ok(Json(serde_json::json!({ "accepted": true })))
}

/// POST /friends/requests/:id/reject - Reject an incoming request
async fn reject_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let friends = friends_for(&state)?;
    let pending = friends.request(&id).await?;
    friends.reject_request(&pending).await?;
    Ok(Json(serde_json::json!({ "rejected": true })))
}

/// POST /friends/requests/:id/cancel - Withdraw an outgoing request
async fn cancel_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let friends = friends_for(&state)?;
    let pending = friends.request(&id).await?;
    friends.cancel_request(&pending).await?;
    Ok(Json(serde_json::json!({ "cancelled": true })))
}

/// DELETE /friends/:uid - Remove a friend (both edge directions)
async fn remove_friend(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let friends = friends_for(&state)?;
    friends.remove_friend(&uid).await?;
    Ok(Json(serde_json::json!({ "removed": true })))
}
