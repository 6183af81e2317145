//! Six Ways MOOC student authorization.
//!
//! Course pages need a signed-in user. Anonymous visitors are sent to the
//! sign-in page with a `referer` pointing back at the page they asked for.
//! Signed-in users get a MOOC student profile created on first visit.

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    config::Config,
    error::AppError,
    middleware::auth::{CurrentUser, query_token},
    models::mooc_student::MoocStudent,
    state::AppState,
};

/// The MOOC profile of the signed-in user, attached to request extensions.
#[derive(Debug, Clone)]
pub struct CurrentMoocStudent(pub MoocStudent);

/// Sign-in URL carrying the original token (if any) and the page to return to.
pub fn sign_in_url(config: &Config, uri: &Uri) -> String {
    let referer = format!("{}{}", config.app_base_url.trim_end_matches('/'), uri);

    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(token) = query_token(uri) {
        query.append_pair("token", &token);
    }
    query.append_pair("referer", &referer);

    format!("/user_sessions/new?{}", query.finish())
}

pub async fn authorize_student(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(user) = request.extensions().get::<CurrentUser>().cloned() else {
        let location = sign_in_url(&state.config, request.uri());
        return Ok(Redirect::to(&location).into_response());
    };

    let student = state.store.find_or_create_mooc_student(user.user_id).await?;
    request.extensions_mut().insert(CurrentMoocStudent(student));

    Ok(next.run(request).await)
}
