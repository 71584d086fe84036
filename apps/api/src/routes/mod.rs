pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessment::handlers as assessment;
use crate::auth::handlers as auth;
use crate::feedback::handlers as feedback;
use crate::recruiter::handlers as recruiter;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/login", post(auth::handle_login))
        // Assessment flow
        .route("/start", post(assessment::handle_start))
        .route("/submit", post(assessment::handle_submit))
        .route("/profile/:session_id", get(assessment::handle_profile))
        .route(
            "/generate-question",
            post(assessment::handle_generate_question),
        )
        // Recruiter views
        .route(
            "/recruiter/candidates",
            get(recruiter::handle_list_candidates),
        )
        .route("/recruiter/compare", post(recruiter::handle_compare))
        .route("/recruiter/trends", get(recruiter::handle_trends))
        // Candidate feedback
        .route(
            "/candidate/feedback/:session_id",
            get(feedback::handle_feedback),
        )
        .route(
            "/candidate/feedback-pdf/:session_id",
            get(feedback::handle_feedback_pdf),
        )
        .with_state(state)
}
