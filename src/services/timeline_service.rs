//! Timeline builder - founders recording startup milestones.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::timeline_event::{
    NewTimelineEvent, TimelineEvent, TimelineEventDraft, TimelineEventRequest,
    TimelineEventResponse, TimelineEventType,
};
use crate::store::IncubatorStore;

/// Ensure the startup exists and the user is one of its founders.
async fn authorize_founder(
    store: &dyn IncubatorStore,
    startup_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    if !store.startup_exists(startup_id).await? {
        return Err(AppError::StartupNotFound);
    }
    if !store.is_founder(startup_id, user_id).await? {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Validate a draft and resolve its event type key.
async fn resolve_draft(
    store: &dyn IncubatorStore,
    draft: &TimelineEventDraft,
) -> Result<TimelineEventType, AppError> {
    draft.validate().map_err(AppError::Validation)?;

    let key = draft.timeline_event_type.as_deref().unwrap_or_default();
    store
        .timeline_event_type_by_key(key.trim())
        .await?
        .ok_or_else(|| {
            let mut errors = crate::error::FieldErrors::new();
            errors.insert(
                "timeline_event_type".to_string(),
                vec!["is not a known event type".to_string()],
            );
            AppError::Validation(errors)
        })
}

async fn respond(
    store: &dyn IncubatorStore,
    event: TimelineEvent,
) -> Result<TimelineEventResponse, AppError> {
    let event_type = store
        .timeline_event_type(event.timeline_event_type_id)
        .await?
        .ok_or_else(|| AppError::Internal("Timeline event has no type".to_string()))?;

    Ok(TimelineEventResponse::new(event, &event_type))
}

/// List a startup's events, newest first.
pub async fn list_events(
    store: &dyn IncubatorStore,
    startup_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<TimelineEventResponse>, AppError> {
    authorize_founder(store, startup_id, user_id).await?;

    let events = store.timeline_events_for_startup(startup_id).await?;
    let mut responses = Vec::with_capacity(events.len());
    for event in events {
        responses.push(respond(store, event).await?);
    }

    Ok(responses)
}

/// Create an event pending verification.
pub async fn create_event(
    store: &dyn IncubatorStore,
    startup_id: Uuid,
    user_id: Uuid,
    request: TimelineEventRequest,
) -> Result<TimelineEventResponse, AppError> {
    authorize_founder(store, startup_id, user_id).await?;

    let draft = TimelineEventDraft {
        timeline_event_type: request.timeline_event_type,
        description: request.description.unwrap_or_default(),
        event_on: request.event_on,
        links: request.links.unwrap_or_default(),
    };
    let event_type = resolve_draft(store, &draft).await?;

    let event = store
        .create_timeline_event(NewTimelineEvent {
            startup_id,
            founder_id: user_id,
            timeline_event_type_id: event_type.id,
            description: draft.description.trim().to_string(),
            // validate() guarantees presence
            event_on: draft.event_on.ok_or(AppError::Internal(
                "Validated draft lost its date".to_string(),
            ))?,
            links: draft.links,
        })
        .await?;

    tracing::info!(event_id = %event.id, startup_id = %startup_id, "Timeline event submitted");

    Ok(TimelineEventResponse::new(event, &event_type))
}

/// Edit an event. Fields absent from the request keep their values.
///
/// Editing a verified event sends it back to pending verification.
pub async fn update_event(
    store: &dyn IncubatorStore,
    event_id: Uuid,
    user_id: Uuid,
    request: TimelineEventRequest,
) -> Result<TimelineEventResponse, AppError> {
    let mut event = store
        .timeline_event(event_id)
        .await?
        .ok_or(AppError::TimelineEventNotFound)?;
    authorize_founder(store, event.startup_id, user_id).await?;

    let current_key = match request.timeline_event_type {
        Some(key) => Some(key),
        None => store
            .timeline_event_type(event.timeline_event_type_id)
            .await?
            .map(|t| t.key),
    };
    let draft = TimelineEventDraft {
        timeline_event_type: current_key,
        description: request.description.unwrap_or_else(|| event.description.clone()),
        event_on: request.event_on.or(Some(event.event_on)),
        links: request.links.unwrap_or_else(|| event.links.0.clone()),
    };
    let event_type = resolve_draft(store, &draft).await?;

    if event.verified_at.take().is_some() {
        tracing::info!(event_id = %event.id, "Verified timeline event edited, pending review again");
    }
    event.timeline_event_type_id = event_type.id;
    event.description = draft.description.trim().to_string();
    event.event_on = draft.event_on.unwrap_or(event.event_on);
    event.links.0 = draft.links;

    store.update_timeline_event(&event).await?;

    respond(store, event).await
}
