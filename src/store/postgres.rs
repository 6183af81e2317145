//! PostgreSQL implementation of `IncubatorStore` using sqlx.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::{
    application::{ApplicationStage, Batch, BatchApplicant, BatchApplication, StageAdvance},
    mooc_student::MoocStudent,
    payment::{NewPayment, Payment},
    timeline_event::{NewTimelineEvent, TimelineEvent, TimelineEventType},
    user::User,
};

use super::IncubatorStore;

const PAYMENT_COLUMNS: &str = "id, batch_application_id, amount, fees, \
    instamojo_payment_request_id, instamojo_payment_request_status, \
    instamojo_payment_id, instamojo_payment_status, short_url, long_url, \
    paid_at, created_at, updated_at";

const TIMELINE_EVENT_COLUMNS: &str = "id, startup_id, founder_id, timeline_event_type_id, \
    description, event_on, links, verified_at, created_at, updated_at";

const MOOC_STUDENT_COLUMNS: &str =
    "id, user_id, name, gender, university_id, college, semester, state";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IncubatorStore for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn application_stage(&self, id: Uuid) -> Result<Option<ApplicationStage>, AppError> {
        let stage = sqlx::query_as::<_, ApplicationStage>(
            "SELECT id, name, number FROM application_stages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stage)
    }

    async fn next_application_stage(
        &self,
        number: i32,
    ) -> Result<Option<ApplicationStage>, AppError> {
        let stage = sqlx::query_as::<_, ApplicationStage>(
            r#"
            SELECT id, name, number
            FROM application_stages
            WHERE number > $1
            ORDER BY number ASC
            LIMIT 1
            "#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stage)
    }

    async fn batch(&self, id: Uuid) -> Result<Option<Batch>, AppError> {
        let batch =
            sqlx::query_as::<_, Batch>("SELECT id, name, batch_number FROM batches WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(batch)
    }

    async fn batch_application(&self, id: Uuid) -> Result<Option<BatchApplication>, AppError> {
        let application = sqlx::query_as::<_, BatchApplication>(
            r#"
            SELECT id, batch_id, application_stage_id, team_lead_id, fee, created_at
            FROM batch_applications
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    async fn batch_applicant(&self, id: Uuid) -> Result<Option<BatchApplicant>, AppError> {
        let applicant = sqlx::query_as::<_, BatchApplicant>(
            "SELECT id, name, email, role, current_address FROM batch_applicants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(applicant)
    }

    async fn batch_applicants(
        &self,
        batch_application_id: Uuid,
    ) -> Result<Vec<BatchApplicant>, AppError> {
        let applicants = sqlx::query_as::<_, BatchApplicant>(
            r#"
            SELECT a.id, a.name, a.email, a.role, a.current_address
            FROM batch_applicants a
            JOIN batch_application_members m ON m.batch_applicant_id = a.id
            WHERE m.batch_application_id = $1
            ORDER BY m.position ASC
            "#,
        )
        .bind(batch_application_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applicants)
    }

    async fn payment_by_request_id(
        &self,
        payment_request_id: &str,
    ) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE instamojo_payment_request_id = $1"
        ))
        .bind(payment_request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    async fn latest_payment_for_application(
        &self,
        batch_application_id: Uuid,
    ) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments \
             WHERE batch_application_id = $1 ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(batch_application_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, AppError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (
                batch_application_id,
                amount,
                instamojo_payment_request_id,
                instamojo_payment_request_status,
                short_url,
                long_url
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment.batch_application_id)
        .bind(payment.amount)
        .bind(&payment.instamojo_payment_request_id)
        .bind(&payment.instamojo_payment_request_status)
        .bind(&payment.short_url)
        .bind(&payment.long_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(payment)
    }

    async fn save_payment(
        &self,
        payment: &Payment,
        advance: Option<StageAdvance>,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        // Rows with paid_at set are credited and never rewritten
        let updated = sqlx::query(
            r#"
            UPDATE payments
            SET instamojo_payment_id = $1,
                instamojo_payment_request_status = $2,
                instamojo_payment_status = $3,
                fees = $4,
                paid_at = $5,
                updated_at = NOW()
            WHERE id = $6 AND paid_at IS NULL
            "#,
        )
        .bind(&payment.instamojo_payment_id)
        .bind(&payment.instamojo_payment_request_status)
        .bind(&payment.instamojo_payment_status)
        .bind(payment.fees)
        .bind(payment.paid_at)
        .bind(payment.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            tracing::info!(payment_id = %payment.id, "Payment already credited, not rewritten");
            return Ok(false);
        }

        let mut advanced = false;
        if let Some(advance) = advance {
            // Guarded on the current stage so concurrent callbacks move it once
            let moved = sqlx::query(
                r#"
                UPDATE batch_applications
                SET application_stage_id = $1
                WHERE id = $2 AND application_stage_id = $3
                "#,
            )
            .bind(advance.to_stage_id)
            .bind(advance.batch_application_id)
            .bind(advance.from_stage_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            advanced = moved == 1;
        }

        tx.commit().await?;

        Ok(advanced)
    }

    async fn user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, login_token_hash FROM users WHERE login_token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_or_create_mooc_student(&self, user_id: Uuid) -> Result<MoocStudent, AppError> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let student = sqlx::query_as::<_, MoocStudent>(&format!(
            r#"
            INSERT INTO mooc_students (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING {MOOC_STUDENT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(student)
    }

    async fn update_mooc_student(&self, student: &MoocStudent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE mooc_students
            SET name = $1,
                gender = $2,
                university_id = $3,
                college = $4,
                semester = $5,
                state = $6,
                updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(&student.name)
        .bind(&student.gender)
        .bind(student.university_id)
        .bind(&student.college)
        .bind(&student.semester)
        .bind(&student.state)
        .bind(student.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn startup_exists(&self, startup_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM startups WHERE id = $1)")
            .bind(startup_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn is_founder(&self, startup_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let founder: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM startup_founders WHERE startup_id = $1 AND user_id = $2)",
        )
        .bind(startup_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(founder)
    }

    async fn timeline_event_type(&self, id: Uuid) -> Result<Option<TimelineEventType>, AppError> {
        let event_type = sqlx::query_as::<_, TimelineEventType>(
            "SELECT id, key, title FROM timeline_event_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event_type)
    }

    async fn timeline_event_type_by_key(
        &self,
        key: &str,
    ) -> Result<Option<TimelineEventType>, AppError> {
        let event_type = sqlx::query_as::<_, TimelineEventType>(
            "SELECT id, key, title FROM timeline_event_types WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event_type)
    }

    async fn timeline_events_for_startup(
        &self,
        startup_id: Uuid,
    ) -> Result<Vec<TimelineEvent>, AppError> {
        let events = sqlx::query_as::<_, TimelineEvent>(&format!(
            "SELECT {TIMELINE_EVENT_COLUMNS} FROM timeline_events \
             WHERE startup_id = $1 ORDER BY created_at DESC"
        ))
        .bind(startup_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn timeline_event(&self, id: Uuid) -> Result<Option<TimelineEvent>, AppError> {
        let event = sqlx::query_as::<_, TimelineEvent>(&format!(
            "SELECT {TIMELINE_EVENT_COLUMNS} FROM timeline_events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn create_timeline_event(
        &self,
        event: NewTimelineEvent,
    ) -> Result<TimelineEvent, AppError> {
        let event = sqlx::query_as::<_, TimelineEvent>(&format!(
            r#"
            INSERT INTO timeline_events (
                startup_id,
                founder_id,
                timeline_event_type_id,
                description,
                event_on,
                links
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TIMELINE_EVENT_COLUMNS}
            "#
        ))
        .bind(event.startup_id)
        .bind(event.founder_id)
        .bind(event.timeline_event_type_id)
        .bind(&event.description)
        .bind(event.event_on)
        .bind(sqlx::types::Json(&event.links))
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    async fn update_timeline_event(&self, event: &TimelineEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE timeline_events
            SET timeline_event_type_id = $1,
                description = $2,
                event_on = $3,
                links = $4,
                verified_at = $5,
                updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(event.timeline_event_type_id)
        .bind(&event.description)
        .bind(event.event_on)
        .bind(&event.links)
        .bind(event.verified_at)
        .bind(event.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
