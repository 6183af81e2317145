//! Feature flag gates for route groups.
//!
//! A locked route group answers 404, as if it did not exist.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, features::SIX_WAYS_MOOC, state::AppState};

/// Lock the Six Ways MOOC pages behind `six_ways_mooc`.
pub async fn require_six_ways_mooc(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.features.is_active(SIX_WAYS_MOOC) {
        tracing::debug!(path = %request.uri().path(), "Feature six_ways_mooc inactive");
        return Err(AppError::NotFound);
    }
    Ok(next.run(request).await)
}
