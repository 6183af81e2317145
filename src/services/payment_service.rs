//! Payment service - fee collection and stage advancement.
//!
//! This service handles:
//! - Creating gateway payment requests for an application's fee
//! - Reconciling webhook and redirect callbacks onto payment records
//! - Advancing the application to its next stage on a new credit
//!
//! # Advancement Guarantees
//!
//! A payment advances its application at most once: only the callback that
//! moves the payment into `Credit` computes a stage advance, and the store
//! applies it only while the application is still at the stage it was
//! computed against. A credited payment is final: later callbacks, even
//! with another payment id or status, are acknowledged without writing.

use chrono::Utc;

use crate::config::Config;
use crate::error::AppError;
use crate::models::application::{ApplicationStage, StageAdvance};
use crate::models::payment::{NewPayment, Payment, PaymentOutcome, REQUEST_STATUS_COMPLETED};
use crate::services::instamojo::{self, PaymentGateway, PaymentRequestParams};
use crate::store::IncubatorStore;
use uuid::Uuid;

/// Fields of an Instamojo webhook POST.
///
/// Missing fields default to empty strings so they fall through to the
/// signature check instead of failing extraction.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct WebhookParams {
    #[serde(default)]
    pub payment_request_id: String,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub fees: String,
    pub mac: Option<String>,
}

/// Start (or resume) fee payment for an application.
///
/// # Process
///
/// 1. Load the application and its team lead
/// 2. Reject if the fee was already paid
/// 3. Reuse a pending payment request if one exists
/// 4. Otherwise create a gateway payment request and record it
///
/// # Returns
///
/// The payment whose `long_url` the applicant should be sent to.
pub async fn start_payment(
    store: &dyn IncubatorStore,
    gateway: &dyn PaymentGateway,
    config: &Config,
    batch_application_id: Uuid,
) -> Result<Payment, AppError> {
    let application = store
        .batch_application(batch_application_id)
        .await?
        .ok_or(AppError::ApplicationNotFound)?;

    if let Some(existing) = store
        .latest_payment_for_application(application.id)
        .await?
    {
        if existing.is_credited() {
            return Err(AppError::Unprocessable(
                "Application fee has already been paid".to_string(),
            ));
        }
        return Ok(existing);
    }

    let team_lead = store
        .batch_applicant(application.team_lead_id)
        .await?
        .ok_or_else(|| AppError::Internal("Application has no team lead".to_string()))?;

    let request = gateway
        .create_payment_request(PaymentRequestParams {
            amount: application.fee,
            purpose: "Application fee".to_string(),
            buyer_name: team_lead.name.clone(),
            email: team_lead.email.clone(),
            redirect_url: config.redirect_url(),
            webhook_url: config.webhook_url(),
        })
        .await?;

    let payment = store
        .create_payment(NewPayment {
            batch_application_id: application.id,
            amount: application.fee,
            instamojo_payment_request_id: request.id,
            instamojo_payment_request_status: request.status,
            short_url: request.short_url,
            long_url: request.long_url,
        })
        .await?;

    tracing::info!(
        payment_id = %payment.id,
        application_id = %application.id,
        "Created payment request"
    );

    Ok(payment)
}

/// Apply a verified webhook.
///
/// # Errors
///
/// - `InvalidSignature`: `mac` missing or wrong (nothing is written)
/// - `InvalidRequest`: `fees` is not a decimal
/// - `PaymentNotFound`: unknown payment request id
pub async fn process_webhook(
    store: &dyn IncubatorStore,
    salt: &str,
    params: WebhookParams,
) -> Result<(), AppError> {
    let Some(mac) = params.mac.as_deref() else {
        tracing::warn!(
            payment_request_id = %params.payment_request_id,
            "Webhook without mac rejected"
        );
        return Err(AppError::InvalidSignature);
    };

    if !instamojo::verify_webhook_mac(
        salt,
        &params.fees,
        &params.payment_id,
        &params.payment_request_id,
        &params.status,
        mac,
    ) {
        tracing::warn!(
            payment_request_id = %params.payment_request_id,
            "Webhook with invalid mac rejected"
        );
        return Err(AppError::InvalidSignature);
    }

    let fees = instamojo::parse_amount(&params.fees)?;
    let payment = store
        .payment_by_request_id(&params.payment_request_id)
        .await?
        .ok_or(AppError::PaymentNotFound)?;

    let outcome = PaymentOutcome {
        payment_id: params.payment_id,
        payment_request_status: REQUEST_STATUS_COMPLETED.to_string(),
        payment_status: params.status,
        fees,
    };
    reconcile(store, payment, &outcome).await?;

    Ok(())
}

/// Apply the browser redirect by asking the gateway for the real status.
///
/// # Returns
///
/// The application's stage as it was before any advance, which decides
/// the confirmation page the browser lands on.
pub async fn process_redirect(
    store: &dyn IncubatorStore,
    gateway: &dyn PaymentGateway,
    payment_request_id: &str,
    payment_id: &str,
) -> Result<ApplicationStage, AppError> {
    let payment = store
        .payment_by_request_id(payment_request_id)
        .await?
        .ok_or(AppError::PaymentNotFound)?;

    let details = gateway
        .payment_details(payment_request_id, payment_id)
        .await?;

    let outcome = PaymentOutcome {
        payment_id: payment_id.to_string(),
        payment_request_status: details.payment_request_status,
        payment_status: details.payment_status,
        fees: details.fees,
    };

    reconcile(store, payment, &outcome).await
}

/// Record an outcome and advance the application on a new credit.
///
/// Returns the stage the application was at before this call.
async fn reconcile(
    store: &dyn IncubatorStore,
    mut payment: Payment,
    outcome: &PaymentOutcome,
) -> Result<ApplicationStage, AppError> {
    let application = store
        .batch_application(payment.batch_application_id)
        .await?
        .ok_or(AppError::ApplicationNotFound)?;
    let current_stage = store
        .application_stage(application.application_stage_id)
        .await?
        .ok_or_else(|| AppError::Internal("Application points at a missing stage".to_string()))?;

    if payment.is_credited() {
        tracing::info!(
            payment_id = %payment.id,
            callback_payment_id = %outcome.payment_id,
            callback_status = %outcome.payment_status,
            "Payment already credited, callback ignored"
        );
        return Ok(current_stage);
    }

    let newly_credited = payment.apply_outcome(outcome, Utc::now());

    let advance = if newly_credited {
        match store.next_application_stage(current_stage.number).await? {
            Some(next) => Some(StageAdvance {
                batch_application_id: application.id,
                from_stage_id: current_stage.id,
                to_stage_id: next.id,
            }),
            None => {
                tracing::warn!(
                    application_id = %application.id,
                    stage = current_stage.number,
                    "Payment credited but application is already at the last stage"
                );
                None
            }
        }
    } else {
        None
    };

    let advanced = store.save_payment(&payment, advance).await?;
    if advanced {
        tracing::info!(
            application_id = %application.id,
            from_stage = current_stage.number,
            "Application advanced after payment"
        );
    }

    Ok(current_stage)
}
