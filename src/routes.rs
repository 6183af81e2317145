//! HTTP router assembly.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{handlers, middleware, state::AppState};

/// Build the application router with every route and middleware layer.
pub fn build_router(state: AppState) -> Router {
    // Course pages that need a signed-in student
    let student_routes = Router::new()
        .route("/sixways/start", get(handlers::six_ways_mooc::start))
        .route(
            "/sixways/student_details",
            get(handlers::six_ways_mooc::student_details),
        )
        .route(
            "/sixways/save_student_details",
            post(handlers::six_ways_mooc::save_student_details),
        )
        .route(
            "/sixways/chapter/{id}/{section_id}",
            get(handlers::six_ways_mooc::chapter),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::mooc::authorize_student,
        ));

    // The whole course is locked behind the six_ways_mooc flag
    let six_ways_routes = Router::new()
        .route("/sixways", get(handlers::six_ways_mooc::index))
        .merge(student_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::feature_flag::require_six_ways_mooc,
        ));

    let founder_routes = Router::new()
        .route(
            "/startups/{startup_id}/timeline_events",
            get(handlers::timeline_events::list_timeline_events)
                .post(handlers::timeline_events::create_timeline_event),
        )
        .route(
            "/timeline_events/{id}",
            patch(handlers::timeline_events::update_timeline_event),
        )
        .route_layer(axum_middleware::from_fn(middleware::auth::require_user));

    Router::new()
        // Public routes
        .route("/health", get(handlers::health::health_check))
        .route("/mentoring/options", get(handlers::mentoring::options))
        // Gateway callbacks
        .route("/instamojo/redirect", get(handlers::instamojo::redirect))
        .route("/instamojo/webhook", post(handlers::instamojo::webhook))
        // Applicant flow
        .route(
            "/apply/{application_id}/payment",
            post(handlers::apply::start_payment),
        )
        .route(
            "/apply/{application_id}/agreement",
            get(handlers::apply::agreement),
        )
        .route(
            "/apply/stage/{stage_number}/complete",
            get(handlers::apply::stage_complete),
        )
        .merge(six_ways_routes)
        .merge(founder_routes)
        // Outermost first: trace, then identify the signed-in user (if any)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn_with_state(
                    state.clone(),
                    middleware::auth::load_current_user,
                )),
        )
        .with_state(state)
}
