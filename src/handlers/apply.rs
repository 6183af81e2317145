//! Applicant-facing payment and agreement endpoints.
//!
//! - POST /apply/:application_id/payment - send the applicant to the gateway
//! - GET /apply/stage/:stage_number/complete - stage confirmation page
//! - GET /apply/:application_id/agreement - educational agreement text

use std::path::Path as FsPath;

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Redirect},
};
use uuid::Uuid;

use crate::{
    error::AppError,
    services::{agreement_service, payment_service},
    state::AppState,
    views,
};

/// Start fee payment and redirect (303) to the gateway's payment page.
///
/// A pending payment request is reused; an already paid application
/// answers 422.
pub async fn start_payment(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    let payment = payment_service::start_payment(
        state.store.as_ref(),
        state.gateway.as_ref(),
        &state.config,
        application_id,
    )
    .await?;

    Ok(Redirect::to(&payment.long_url))
}

pub async fn stage_complete(Path(stage_number): Path<i32>) -> Html<String> {
    views::stage_complete(stage_number)
}

/// Educational agreement as `text/plain`.
pub async fn agreement(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let text = agreement_service::build_agreement(
        state.store.as_ref(),
        FsPath::new(&state.config.agreement_fragments_dir),
        application_id,
    )
    .await?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}
