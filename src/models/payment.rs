//! Payment records for application fees collected through Instamojo.
//!
//! A payment is created together with a gateway payment request. The
//! webhook and redirect flows later fill in the gateway-side payment id
//! and status strings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Payment status the gateway reports for a captured payment.
pub const PAYMENT_STATUS_CREDIT: &str = "Credit";

/// Request status recorded once the gateway reports any outcome.
pub const REQUEST_STATUS_COMPLETED: &str = "Completed";

/// Represents a payment record from the database.
///
/// # Database Table
///
/// Maps to the `payments` table. A payment holds at most one external
/// payment id; status fields store exactly what the gateway supplied.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub batch_application_id: Uuid,

    /// Amount requested from the applicant
    pub amount: Decimal,

    /// Gateway fees deducted from the amount, known once paid
    pub fees: Option<Decimal>,

    pub instamojo_payment_request_id: String,
    pub instamojo_payment_request_status: String,
    pub instamojo_payment_id: Option<String>,
    pub instamojo_payment_status: Option<String>,
    pub short_url: Option<String>,
    pub long_url: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a payment after the gateway created the request.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub batch_application_id: Uuid,
    pub amount: Decimal,
    pub instamojo_payment_request_id: String,
    pub instamojo_payment_request_status: String,
    pub short_url: Option<String>,
    pub long_url: String,
}

/// Payment result reported by the gateway, via webhook or API lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub payment_id: String,
    pub payment_request_status: String,
    pub payment_status: String,
    pub fees: Decimal,
}

impl Payment {
    /// Whether the gateway has reported this payment as captured.
    pub fn is_credited(&self) -> bool {
        self.instamojo_payment_status.as_deref() == Some(PAYMENT_STATUS_CREDIT)
    }

    /// Copy the gateway's outcome onto this record.
    ///
    /// Returns `true` when this call moved the payment into the credited
    /// state, which is the only case that should advance the application.
    /// A credited payment is final: later outcomes leave it untouched.
    pub fn apply_outcome(&mut self, outcome: &PaymentOutcome, now: DateTime<Utc>) -> bool {
        if self.is_credited() {
            return false;
        }

        self.instamojo_payment_id = Some(outcome.payment_id.clone());
        self.instamojo_payment_request_status = outcome.payment_request_status.clone();
        self.instamojo_payment_status = Some(outcome.payment_status.clone());
        self.fees = Some(outcome.fees);
        self.updated_at = now;

        let newly_credited = self.is_credited();
        if newly_credited {
            self.paid_at = Some(now);
        }
        newly_credited
    }
}
