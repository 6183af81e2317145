//! Timeline events founders record against their startup.
//!
//! This module defines:
//! - `TimelineEvent`: Database entity for a submitted event
//! - `TimelineEventRequest`: Body for creating or editing an event
//! - `TimelineEventResponse`: Body returned to clients

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::FieldErrors;

pub const MAX_DESCRIPTION_CHARACTERS: usize = 300;
pub const MAX_LINKS: usize = 3;

pub const STATUS_PENDING: &str = "Pending verification";
pub const STATUS_VERIFIED: &str = "Verified";

/// Kind of event, e.g. `team_formed` / "Team Formed".
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct TimelineEventType {
    pub id: Uuid,
    pub key: String,
    pub title: String,
}

/// Link or file attached to an event. Private links are shown to founders only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineLink {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub private: bool,
}

/// Represents a timeline event record from the database.
///
/// `verified_at` is set by reviewers. Any founder edit clears it, putting
/// the event back into review.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TimelineEvent {
    pub id: Uuid,
    pub startup_id: Uuid,
    pub founder_id: Uuid,
    pub timeline_event_type_id: Uuid,
    pub description: String,
    pub event_on: NaiveDate,
    pub links: Json<Vec<TimelineLink>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimelineEvent {
    pub fn status(&self) -> &'static str {
        if self.verified_at.is_some() {
            STATUS_VERIFIED
        } else {
            STATUS_PENDING
        }
    }
}

/// Validated fields for a new event.
#[derive(Debug, Clone)]
pub struct NewTimelineEvent {
    pub startup_id: Uuid,
    pub founder_id: Uuid,
    pub timeline_event_type_id: Uuid,
    pub description: String,
    pub event_on: NaiveDate,
    pub links: Vec<TimelineLink>,
}

/// Body for creating (all fields) or editing (any subset) an event.
///
/// # JSON Example
///
/// ```json
/// {
///   "timeline_event_type": "team_formed",
///   "description": "We formed our founding team",
///   "event_on": "2016-06-01",
///   "links": [{ "title": "SV.CO", "url": "https://sv.co", "private": true }]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineEventRequest {
    pub timeline_event_type: Option<String>,
    pub description: Option<String>,
    pub event_on: Option<NaiveDate>,
    pub links: Option<Vec<TimelineLink>>,
}

/// Event fields after defaults from an existing event were merged in.
#[derive(Debug, Clone)]
pub struct TimelineEventDraft {
    pub timeline_event_type: Option<String>,
    pub description: String,
    pub event_on: Option<NaiveDate>,
    pub links: Vec<TimelineLink>,
}

impl TimelineEventDraft {
    /// Check the draft, returning per-field messages on failure.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut add = |field: &str, message: &str| {
            errors
                .entry(field.to_string())
                .or_default()
                .push(message.to_string());
        };

        if self.description.trim().is_empty() {
            add("description", "can't be blank");
        } else if self.description.chars().count() > MAX_DESCRIPTION_CHARACTERS {
            add(
                "description",
                &format!("is too long (maximum is {MAX_DESCRIPTION_CHARACTERS} characters)"),
            );
        }
        if self.event_on.is_none() {
            add("event_on", "can't be blank");
        }
        if self
            .timeline_event_type
            .as_deref()
            .is_none_or(|key| key.trim().is_empty())
        {
            add("timeline_event_type", "can't be blank");
        }

        if self.links.len() > MAX_LINKS {
            add("links", &format!("cannot have more than {MAX_LINKS} links"));
        }
        for (index, link) in self.links.iter().enumerate() {
            if link.title.trim().is_empty() {
                add(&format!("links[{index}].title"), "can't be blank");
            }
            if !is_web_url(&link.url) {
                add(&format!("links[{index}].url"), "is not a valid URL");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn is_web_url(raw: &str) -> bool {
    url::Url::parse(raw.trim())
        .map(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some())
        .unwrap_or(false)
}

/// Response returned for timeline event operations.
#[derive(Debug, Serialize)]
pub struct TimelineEventResponse {
    pub id: Uuid,
    pub startup_id: Uuid,
    pub event_type: String,
    pub description: String,
    pub event_on: NaiveDate,
    pub links: Vec<TimelineLink>,
    pub status: String,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TimelineEventResponse {
    pub fn new(event: TimelineEvent, event_type: &TimelineEventType) -> Self {
        Self {
            status: event.status().to_string(),
            id: event.id,
            startup_id: event.startup_id,
            event_type: event_type.title.clone(),
            description: event.description,
            event_on: event.event_on,
            links: event.links.0,
            verified_at: event.verified_at,
            created_at: event.created_at,
        }
    }
}
