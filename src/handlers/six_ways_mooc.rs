//! Six Ways MOOC pages.
//!
//! Every route sits behind the `six_ways_mooc` feature flag. All but the
//! landing page also need a signed-in student (see `middleware::mooc`).

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    error::{AppError, FieldErrors},
    middleware::mooc::CurrentMoocStudent,
    models::mooc_student::StudentDetailsForm,
    state::AppState,
    views,
};

/// Sections available in each chapter.
const CHAPTER_SECTIONS: &[(u32, &[u32])] = &[(1, &[1, 2]), (2, &[1])];

fn section_exists(chapter: u32, section: u32) -> bool {
    CHAPTER_SECTIONS
        .iter()
        .any(|(id, sections)| *id == chapter && sections.contains(&section))
}

/// GET /sixways - landing page
pub async fn index() -> Html<String> {
    views::six_ways_index()
}

/// GET /sixways/start - course start, once details are complete
pub async fn start(Extension(CurrentMoocStudent(student)): Extension<CurrentMoocStudent>) -> Response {
    if !student.details_complete() {
        return Redirect::to("/sixways/student_details").into_response();
    }
    views::six_ways_start(&student).into_response()
}

/// GET /sixways/student_details - details form
pub async fn student_details(
    Extension(CurrentMoocStudent(student)): Extension<CurrentMoocStudent>,
) -> Html<String> {
    views::student_details(&StudentDetailsForm::from(&student), &FieldErrors::new())
}

/// POST /sixways/save_student_details
///
/// Redirects to the course start on success. Invalid details re-render the
/// form with HTTP 200 and the validation messages.
pub async fn save_student_details(
    State(state): State<AppState>,
    Extension(CurrentMoocStudent(mut student)): Extension<CurrentMoocStudent>,
    Form(form): Form<StudentDetailsForm>,
) -> Result<Response, AppError> {
    let details = match form.validate() {
        Ok(details) => details,
        Err(errors) => return Ok(views::student_details(&form, &errors).into_response()),
    };

    student.apply_details(details);
    state.store.update_mooc_student(&student).await?;
    tracing::info!(student_id = %student.id, "MOOC student details saved");

    Ok(Redirect::to("/sixways/start").into_response())
}

/// GET /sixways/chapter/:id/:section_id
pub async fn chapter(Path((chapter, section)): Path<(String, String)>) -> Result<Html<String>, AppError> {
    let (Ok(chapter), Ok(section)) = (chapter.parse::<u32>(), section.parse::<u32>()) else {
        return Err(AppError::NotFound);
    };
    if !section_exists(chapter, section) {
        return Err(AppError::NotFound);
    }

    Ok(views::six_ways_chapter(chapter, section))
}
