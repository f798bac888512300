//! Event endpoints: CRUD, RSVPs, and the two calendar views.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use serde::Deserialize;

use huddle_core::{EventDraft, RsvpStatus};
use huddle_lib::schedule::{AvailabilitySlot, CalendarEntry, Schedule};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(calendar))
        .route("/events", post(create_event))
        .route("/events/{id}", put(edit_event))
        .route("/events/{id}", delete(delete_event))
        .route("/events/{id}/rsvp", post(respond))
        .route("/availability", get(availability))
}

fn schedule_for(state: &AppState) -> Result<Schedule, AppError> {
    let viewer = state.viewer()?;
    Ok(Schedule::new(state.store.clone(), viewer))
}

/// GET /events - The viewer's calendar
async fn calendar(State(state): State<AppState>) -> Result<Json<Vec<CalendarEntry>>, AppError> {
    let schedule = schedule_for(&state)?;
    Ok(Json(schedule.calendar_now().await))
}

/// Request body for creating or editing an event
#[derive(Deserialize)]
pub struct EventRequest {
    #[serde(flatten)]
    pub draft: EventDraft,
    #[serde(default)]
    pub invitees: Vec<String>,
}

/// POST /events - Create an event organized by the viewer
async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<EventRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let schedule = schedule_for(&state)?;
    let id = schedule.create_event(req.draft, &req.invitees).await?;
    Ok(Json(serde_json::json!({ "id": id })))
}

/// PUT /events/:id - Rewrite an event, organizer only
async fn edit_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EventRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let schedule = schedule_for(&state)?;
    schedule.edit_event(&id, req.draft, &req.invitees).await?;
    Ok(Json(serde_json::json!({ "updated": true })))
}

/// Request body for an RSVP
#[derive(Deserialize)]
pub struct RsvpRequest {
    pub status: RsvpStatus,
}

/// POST /events/:id/rsvp - Record the viewer's RSVP
async fn respond(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RsvpRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let schedule = schedule_for(&state)?;
    schedule.respond(&id, req.status).await?;
    Ok(Json(serde_json::json!({ "status": req.status })))
}

/// DELETE /events/:id - Delete an event, organizer only
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let schedule = schedule_for(&state)?;
    schedule.delete_event(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    /// Comma-separated friend uids to overlay
    #[serde(default)]
    pub friends: String,
}

/// GET /availability?friends=a,b - Shared availability over the viewer
/// plus the selected friends
async fn availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<AvailabilitySlot>>, AppError> {
    let schedule = schedule_for(&state)?;
    let selected: Vec<String> = query
        .friends
        .split(',')
        .filter(|uid| !uid.is_empty())
        .map(str::to_string)
        .collect();
    Ok(Json(schedule.availability_now(&selected).await))
}
