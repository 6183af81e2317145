//! Application stages, batches and the applications moving through them.
//!
//! A batch application always points at exactly one `ApplicationStage`.
//! Stages are ordered by `number`; a successful payment moves the
//! application to the stage with the next higher number.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// One ordered step of the application process (e.g. "Payment", "Coding").
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct ApplicationStage {
    pub id: Uuid,
    pub name: String,

    /// Position of the stage in the process, unique across stages.
    pub number: i32,
}

/// A program cohort that applicants apply to.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Batch {
    pub id: Uuid,
    pub name: String,
    pub batch_number: i32,
}

/// A person named on an application.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct BatchApplicant {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    /// Functional role within the team, e.g. "product" or "engineering".
    pub role: String,
    pub current_address: Option<String>,
}

impl BatchApplicant {
    /// Designation printed on agreements, e.g. "Engineering Lead".
    pub fn designation(&self) -> String {
        format!("{} Lead", capitalize(&self.role))
    }
}

/// A team's submission to join a batch.
///
/// # Database Table
///
/// Maps to the `batch_applications` table. The `fee` is what the team
/// pays through the gateway to clear the payment stage.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct BatchApplication {
    pub id: Uuid,
    pub batch_id: Uuid,

    /// Current stage pointer
    pub application_stage_id: Uuid,
    pub team_lead_id: Uuid,
    pub fee: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Moves an application from one stage to the next.
///
/// `from_stage_id` is the stage the move was computed against. Stores only
/// apply the move while the application is still at that stage, so a
/// redelivered callback cannot advance twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageAdvance {
    pub batch_application_id: Uuid,
    pub from_stage_id: Uuid,
    pub to_stage_id: Uuid,
}

/// Upper-case the first character and lower-case the rest.
pub(crate) fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
