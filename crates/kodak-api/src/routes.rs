use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, contact, courses, diagnostics, pages};

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(pages::index))
        .route("/register", get(pages::register_page).post(auth::register))
        .route("/login", get(pages::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/courses", get(courses::list_courses))
        .route("/courses/{course_id}", get(courses::course_detail))
        .route("/lessons/{lesson_id}", get(courses::lesson_detail))
        .route("/contact", get(pages::contact_page).post(contact::submit_contact))
        .route("/test-db", get(diagnostics::test_db));

    let protected_routes = Router::new()
        .route("/profile", get(pages::profile))
        .route("/lessons/{lesson_id}/complete", post(courses::complete_lesson))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
