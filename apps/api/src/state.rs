use std::sync::Arc;

use crate::assessment::session::SessionStore;
use crate::assessment::store::AssessmentStore;
use crate::auth::Authenticator;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Candidates, responses and trait scores. Postgres in production.
    pub store: Arc<dyn AssessmentStore>,
    /// Session token -> candidate id. Redis in production.
    pub sessions: Arc<dyn SessionStore>,
    pub llm: LlmClient,
    pub auth: Arc<Authenticator>,
}
