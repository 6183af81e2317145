//! Persistence port for the incubator records.
//!
//! Handlers and services talk to storage only through `IncubatorStore`.
//! `PgStore` backs the running server; `MemoryStore` backs tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    application::{ApplicationStage, Batch, BatchApplicant, BatchApplication, StageAdvance},
    mooc_student::MoocStudent,
    payment::{NewPayment, Payment},
    timeline_event::{NewTimelineEvent, TimelineEvent, TimelineEventType},
    user::User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait IncubatorStore: Send + Sync {
    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), AppError>;

    async fn application_stage(&self, id: Uuid) -> Result<Option<ApplicationStage>, AppError>;

    /// Stage with the smallest number greater than `number`.
    async fn next_application_stage(
        &self,
        number: i32,
    ) -> Result<Option<ApplicationStage>, AppError>;

    async fn batch(&self, id: Uuid) -> Result<Option<Batch>, AppError>;

    async fn batch_application(&self, id: Uuid) -> Result<Option<BatchApplication>, AppError>;

    async fn batch_applicant(&self, id: Uuid) -> Result<Option<BatchApplicant>, AppError>;

    /// Applicants named on an application, in the order they were added.
    async fn batch_applicants(
        &self,
        batch_application_id: Uuid,
    ) -> Result<Vec<BatchApplicant>, AppError>;

    async fn payment_by_request_id(
        &self,
        payment_request_id: &str,
    ) -> Result<Option<Payment>, AppError>;

    /// Most recently created payment for an application.
    async fn latest_payment_for_application(
        &self,
        batch_application_id: Uuid,
    ) -> Result<Option<Payment>, AppError>;

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, AppError>;

    /// Persist payment fields and, when given, move the application's stage
    /// pointer. Both writes happen atomically. The advance is skipped when
    /// the application is no longer at `advance.from_stage_id`; the return
    /// value reports whether the stage moved.
    ///
    /// A payment already stored with `paid_at` set is final: nothing is
    /// written and no advance is applied.
    async fn save_payment(
        &self,
        payment: &Payment,
        advance: Option<StageAdvance>,
    ) -> Result<bool, AppError>;

    async fn user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>, AppError>;

    async fn find_or_create_mooc_student(&self, user_id: Uuid) -> Result<MoocStudent, AppError>;

    async fn update_mooc_student(&self, student: &MoocStudent) -> Result<(), AppError>;

    async fn startup_exists(&self, startup_id: Uuid) -> Result<bool, AppError>;

    async fn is_founder(&self, startup_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    async fn timeline_event_type(&self, id: Uuid) -> Result<Option<TimelineEventType>, AppError>;

    async fn timeline_event_type_by_key(
        &self,
        key: &str,
    ) -> Result<Option<TimelineEventType>, AppError>;

    /// Events of a startup, newest first.
    async fn timeline_events_for_startup(
        &self,
        startup_id: Uuid,
    ) -> Result<Vec<TimelineEvent>, AppError>;

    async fn timeline_event(&self, id: Uuid) -> Result<Option<TimelineEvent>, AppError>;

    async fn create_timeline_event(
        &self,
        event: NewTimelineEvent,
    ) -> Result<TimelineEvent, AppError>;

    async fn update_timeline_event(&self, event: &TimelineEvent) -> Result<(), AppError>;
}
