//! Mentoring directory form options.

use axum::Json;

use crate::models::mentor::MentoringOptions;

/// GET /mentoring/options - every select option set for mentor forms.
pub async fn options() -> Json<MentoringOptions> {
    Json(MentoringOptions::all())
}
