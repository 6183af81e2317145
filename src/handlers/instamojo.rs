//! Instamojo callback handlers.
//!
//! - GET /instamojo/redirect - browser lands here after paying
//! - POST /instamojo/webhook - gateway reports the payment outcome

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    services::payment_service::{self, WebhookParams},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RedirectParams {
    pub payment_request_id: String,
    pub payment_id: String,
}

/// Path of the confirmation page for a finished stage.
pub fn stage_complete_path(stage_number: i32) -> String {
    format!("/apply/stage/{}/complete", stage_number)
}

/// Reconcile a payment from the browser redirect.
///
/// # Query
///
/// `?payment_request_id=<id>&payment_id=<id>`
///
/// # Response
///
/// 303 to `/apply/stage/{n}/complete`, where `n` is the stage the
/// application was at when it paid.
///
/// # Security
///
/// The query is not trusted: status and fees come from a direct gateway
/// lookup, so no signature is needed here.
pub async fn redirect(
    State(state): State<AppState>,
    Query(params): Query<RedirectParams>,
) -> Result<Redirect, AppError> {
    let paid_stage = payment_service::process_redirect(
        state.store.as_ref(),
        state.gateway.as_ref(),
        &params.payment_request_id,
        &params.payment_id,
    )
    .await?;

    Ok(Redirect::to(&stage_complete_path(paid_stage.number)))
}

/// Reconcile a payment from the gateway webhook.
///
/// # Request Body
///
/// Form fields `payment_request_id, payment_id, status, fees, mac`.
///
/// # Response
///
/// - 200 once the payment is recorded
/// - 401 when `mac` is missing or wrong; nothing is written
pub async fn webhook(
    State(state): State<AppState>,
    Form(params): Form<WebhookParams>,
) -> Result<StatusCode, AppError> {
    payment_service::process_webhook(state.store.as_ref(), &state.config.instamojo_salt, params)
        .await?;

    Ok(StatusCode::OK)
}
