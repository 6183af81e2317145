//! In-memory implementation of `IncubatorStore`.
//!
//! Holds every table in one `tokio::sync::RwLock` so multi-record writes
//! (payment plus stage pointer) are atomic the same way a database
//! transaction would make them. Used by tests and local demos; the
//! `insert_*` methods seed fixtures.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    application::{ApplicationStage, Batch, BatchApplicant, BatchApplication, StageAdvance},
    mooc_student::MoocStudent,
    payment::{NewPayment, Payment},
    timeline_event::{NewTimelineEvent, TimelineEvent, TimelineEventType},
    user::User,
};

use super::IncubatorStore;

#[derive(Default)]
struct Tables {
    stages: HashMap<Uuid, ApplicationStage>,
    batches: HashMap<Uuid, Batch>,
    applicants: HashMap<Uuid, BatchApplicant>,
    applications: HashMap<Uuid, BatchApplication>,
    members: HashMap<Uuid, Vec<Uuid>>,
    payments: HashMap<Uuid, Payment>,
    users: HashMap<Uuid, User>,
    mooc_students: HashMap<Uuid, MoocStudent>,
    startups: HashMap<Uuid, String>,
    founders: HashSet<(Uuid, Uuid)>,
    event_types: HashMap<Uuid, TimelineEventType>,
    events: HashMap<Uuid, TimelineEvent>,
}

/// A thread-safe in-memory store.
#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_application_stage(&self, stage: ApplicationStage) {
        self.tables.write().await.stages.insert(stage.id, stage);
    }

    pub async fn insert_batch(&self, batch: Batch) {
        self.tables.write().await.batches.insert(batch.id, batch);
    }

    pub async fn insert_batch_applicant(&self, applicant: BatchApplicant) {
        self.tables
            .write()
            .await
            .applicants
            .insert(applicant.id, applicant);
    }

    /// Insert an application with its members in order.
    pub async fn insert_batch_application(
        &self,
        application: BatchApplication,
        member_ids: Vec<Uuid>,
    ) {
        let mut tables = self.tables.write().await;
        tables.members.insert(application.id, member_ids);
        tables.applications.insert(application.id, application);
    }

    pub async fn insert_payment(&self, payment: Payment) {
        self.tables.write().await.payments.insert(payment.id, payment);
    }

    pub async fn insert_user(&self, user: User) {
        self.tables.write().await.users.insert(user.id, user);
    }

    pub async fn insert_startup(&self, startup_id: Uuid, name: &str, founder_ids: &[Uuid]) {
        let mut tables = self.tables.write().await;
        tables.startups.insert(startup_id, name.to_string());
        for founder_id in founder_ids {
            tables.founders.insert((startup_id, *founder_id));
        }
    }

    pub async fn insert_timeline_event_type(&self, event_type: TimelineEventType) {
        self.tables
            .write()
            .await
            .event_types
            .insert(event_type.id, event_type);
    }

    pub async fn insert_timeline_event(&self, event: TimelineEvent) {
        self.tables.write().await.events.insert(event.id, event);
    }

    pub async fn mooc_student_for_user(&self, user_id: Uuid) -> Option<MoocStudent> {
        self.tables
            .read()
            .await
            .mooc_students
            .values()
            .find(|s| s.user_id == user_id)
            .cloned()
    }
}

#[async_trait]
impl IncubatorStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn application_stage(&self, id: Uuid) -> Result<Option<ApplicationStage>, AppError> {
        Ok(self.tables.read().await.stages.get(&id).cloned())
    }

    async fn next_application_stage(
        &self,
        number: i32,
    ) -> Result<Option<ApplicationStage>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .stages
            .values()
            .filter(|stage| stage.number > number)
            .min_by_key(|stage| stage.number)
            .cloned())
    }

    async fn batch(&self, id: Uuid) -> Result<Option<Batch>, AppError> {
        Ok(self.tables.read().await.batches.get(&id).cloned())
    }

    async fn batch_application(&self, id: Uuid) -> Result<Option<BatchApplication>, AppError> {
        Ok(self.tables.read().await.applications.get(&id).cloned())
    }

    async fn batch_applicant(&self, id: Uuid) -> Result<Option<BatchApplicant>, AppError> {
        Ok(self.tables.read().await.applicants.get(&id).cloned())
    }

    async fn batch_applicants(
        &self,
        batch_application_id: Uuid,
    ) -> Result<Vec<BatchApplicant>, AppError> {
        let tables = self.tables.read().await;
        let applicants = tables
            .members
            .get(&batch_application_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| tables.applicants.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();

        Ok(applicants)
    }

    async fn payment_by_request_id(
        &self,
        payment_request_id: &str,
    ) -> Result<Option<Payment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .values()
            .find(|p| p.instamojo_payment_request_id == payment_request_id)
            .cloned())
    }

    async fn latest_payment_for_application(
        &self,
        batch_application_id: Uuid,
    ) -> Result<Option<Payment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .values()
            .filter(|p| p.batch_application_id == batch_application_id)
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, AppError> {
        let mut tables = self.tables.write().await;

        let duplicate = tables
            .payments
            .values()
            .any(|p| p.instamojo_payment_request_id == payment.instamojo_payment_request_id);
        if duplicate {
            return Err(AppError::Unprocessable(
                "Payment request already recorded".to_string(),
            ));
        }

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            batch_application_id: payment.batch_application_id,
            amount: payment.amount,
            fees: None,
            instamojo_payment_request_id: payment.instamojo_payment_request_id,
            instamojo_payment_request_status: payment.instamojo_payment_request_status,
            instamojo_payment_id: None,
            instamojo_payment_status: None,
            short_url: payment.short_url,
            long_url: payment.long_url,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.payments.insert(payment.id, payment.clone());

        Ok(payment)
    }

    async fn save_payment(
        &self,
        payment: &Payment,
        advance: Option<StageAdvance>,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables
            .payments
            .get(&payment.id)
            .is_some_and(|stored| stored.paid_at.is_some())
        {
            return Ok(false);
        }
        tables.payments.insert(payment.id, payment.clone());

        let Some(advance) = advance else {
            return Ok(false);
        };
        match tables.applications.get_mut(&advance.batch_application_id) {
            Some(application) if application.application_stage_id == advance.from_stage_id => {
                application.application_stage_id = advance.to_stage_id;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.login_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn find_or_create_mooc_student(&self, user_id: Uuid) -> Result<MoocStudent, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(student) = tables.mooc_students.values().find(|s| s.user_id == user_id) {
            return Ok(student.clone());
        }

        let student = MoocStudent::blank(user_id);
        tables.mooc_students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn update_mooc_student(&self, student: &MoocStudent) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .mooc_students
            .insert(student.id, student.clone());
        Ok(())
    }

    async fn startup_exists(&self, startup_id: Uuid) -> Result<bool, AppError> {
        Ok(self.tables.read().await.startups.contains_key(&startup_id))
    }

    async fn is_founder(&self, startup_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .founders
            .contains(&(startup_id, user_id)))
    }

    async fn timeline_event_type(&self, id: Uuid) -> Result<Option<TimelineEventType>, AppError> {
        Ok(self.tables.read().await.event_types.get(&id).cloned())
    }

    async fn timeline_event_type_by_key(
        &self,
        key: &str,
    ) -> Result<Option<TimelineEventType>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .event_types
            .values()
            .find(|t| t.key == key)
            .cloned())
    }

    async fn timeline_events_for_startup(
        &self,
        startup_id: Uuid,
    ) -> Result<Vec<TimelineEvent>, AppError> {
        let tables = self.tables.read().await;
        let mut events: Vec<TimelineEvent> = tables
            .events
            .values()
            .filter(|e| e.startup_id == startup_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(events)
    }

    async fn timeline_event(&self, id: Uuid) -> Result<Option<TimelineEvent>, AppError> {
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn create_timeline_event(
        &self,
        event: NewTimelineEvent,
    ) -> Result<TimelineEvent, AppError> {
        let now = Utc::now();
        let event = TimelineEvent {
            id: Uuid::new_v4(),
            startup_id: event.startup_id,
            founder_id: event.founder_id,
            timeline_event_type_id: event.timeline_event_type_id,
            description: event.description,
            event_on: event.event_on,
            links: Json(event.links),
            verified_at: None,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .events
            .insert(event.id, event.clone());

        Ok(event)
    }

    async fn update_timeline_event(&self, event: &TimelineEvent) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.events.get_mut(&event.id) else {
            return Err(AppError::TimelineEventNotFound);
        };
        *stored = TimelineEvent {
            updated_at: Utc::now(),
            ..event.clone()
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stage(number: i32) -> ApplicationStage {
        ApplicationStage {
            id: Uuid::new_v4(),
            name: format!("Stage {number}"),
            number,
        }
    }

    #[tokio::test]
    async fn test_next_stage_skips_gaps() {
        let store = MemoryStore::new();
        for number in [1, 3, 5] {
            store.insert_application_stage(stage(number)).await;
        }

        let next = store.next_application_stage(1).await.unwrap().unwrap();
        assert_eq!(next.number, 3);
        assert!(store.next_application_stage(5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stage_advance_only_from_expected_stage() {
        let store = MemoryStore::new();
        let (first, second) = (stage(1), stage(2));
        let application = BatchApplication {
            id: Uuid::new_v4(),
            batch_id: Uuid::new_v4(),
            application_stage_id: first.id,
            team_lead_id: Uuid::new_v4(),
            fee: dec!(3000),
            created_at: Utc::now(),
        };
        store.insert_batch_application(application.clone(), vec![]).await;
        let payment = store
            .create_payment(NewPayment {
                batch_application_id: application.id,
                amount: dec!(3000),
                instamojo_payment_request_id: "req".to_string(),
                instamojo_payment_request_status: "Pending".to_string(),
                short_url: None,
                long_url: "https://gateway.example/req".to_string(),
            })
            .await
            .unwrap();
        let advance = StageAdvance {
            batch_application_id: application.id,
            from_stage_id: first.id,
            to_stage_id: second.id,
        };

        assert!(store.save_payment(&payment, Some(advance)).await.unwrap());
        // A second advance computed against the old stage is a no-op
        assert!(!store.save_payment(&payment, Some(advance)).await.unwrap());

        let stored = store.batch_application(application.id).await.unwrap().unwrap();
        assert_eq!(stored.application_stage_id, second.id);
    }

    #[tokio::test]
    async fn test_credited_payment_is_not_rewritten() {
        let store = MemoryStore::new();
        let (second, third) = (stage(2), stage(3));
        let application = BatchApplication {
            id: Uuid::new_v4(),
            batch_id: Uuid::new_v4(),
            application_stage_id: second.id,
            team_lead_id: Uuid::new_v4(),
            fee: dec!(3000),
            created_at: Utc::now(),
        };
        store.insert_batch_application(application.clone(), vec![]).await;
        let mut paid = store
            .create_payment(NewPayment {
                batch_application_id: application.id,
                amount: dec!(3000),
                instamojo_payment_request_id: "req".to_string(),
                instamojo_payment_request_status: "Pending".to_string(),
                short_url: None,
                long_url: "https://gateway.example/req".to_string(),
            })
            .await
            .unwrap();
        paid.instamojo_payment_id = Some("MOJO1".to_string());
        paid.instamojo_payment_status = Some("Credit".to_string());
        paid.paid_at = Some(Utc::now());
        store.insert_payment(paid.clone()).await;

        let mut rewritten = paid.clone();
        rewritten.instamojo_payment_id = Some("OTHER".to_string());
        rewritten.paid_at = None;
        let advance = StageAdvance {
            batch_application_id: application.id,
            from_stage_id: second.id,
            to_stage_id: third.id,
        };

        assert!(!store.save_payment(&rewritten, Some(advance)).await.unwrap());
        let stored = store.payment_by_request_id("req").await.unwrap().unwrap();
        assert_eq!(stored, paid);
        let stored = store.batch_application(application.id).await.unwrap().unwrap();
        assert_eq!(stored.application_stage_id, second.id);
    }

    #[tokio::test]
    async fn test_find_or_create_mooc_student_is_stable() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();

        let first = store.find_or_create_mooc_student(user_id).await.unwrap();
        let second = store.find_or_create_mooc_student(user_id).await.unwrap();

        assert_eq!(first.id, second.id);
    }
}
