//! Timeline event HTTP handlers.
//!
//! This module implements the founder timeline endpoints:
//! - GET /startups/:startup_id/timeline_events - list events
//! - POST /startups/:startup_id/timeline_events - submit an event for review
//! - PATCH /timeline_events/:id - edit an event

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::CurrentUser,
    models::timeline_event::{TimelineEventRequest, TimelineEventResponse},
    services::timeline_service,
    state::AppState,
};

pub async fn list_timeline_events(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(startup_id): Path<Uuid>,
) -> Result<Json<Vec<TimelineEventResponse>>, AppError> {
    let events =
        timeline_service::list_events(state.store.as_ref(), startup_id, user.user_id).await?;

    Ok(Json(events))
}

/// Submit a new event.
///
/// # Response
///
/// - **201 Created**: the event, with status "Pending verification"
/// - **403**: user is not a founder of the startup
/// - **422**: validation failed, with per-field messages
pub async fn create_timeline_event(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(startup_id): Path<Uuid>,
    Json(request): Json<TimelineEventRequest>,
) -> Result<(StatusCode, Json<TimelineEventResponse>), AppError> {
    let event =
        timeline_service::create_event(state.store.as_ref(), startup_id, user.user_id, request)
            .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Edit an event. Editing a verified event resets it to pending verification.
pub async fn update_timeline_event(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<TimelineEventRequest>,
) -> Result<Json<TimelineEventResponse>, AppError> {
    let event =
        timeline_service::update_event(state.store.as_ref(), event_id, user.user_id, request)
            .await?;

    Ok(Json(event))
}
