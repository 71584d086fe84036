//! In-memory stores and a router harness for handler tests.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::MockServer;

use crate::assessment::session::SessionStore;
use crate::assessment::store::AssessmentStore;
use crate::auth::{Authenticator, Role};
use crate::config::{AccountConfig, AuthConfig};
use crate::errors::AppError;
use crate::llm_client::test_support::client_for;
use crate::models::assessment::{CandidateRow, ResponseRow, TraitScoreRow};
use crate::routes::build_router;
use crate::state::AppState;

pub const TEST_JWT_SECRET: &str = "unit-test-secret-unit-test-secret";

/// Argon2id hash with minimal cost parameters. Verification reads the
/// parameters back from the PHC string, so production code accepts it.
pub fn cheap_hash(password: &str) -> String {
    let params = Params::new(1024, 1, 1, None).unwrap();
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

fn test_auth_config() -> &'static AuthConfig {
    static CONFIG: OnceLock<AuthConfig> = OnceLock::new();
    CONFIG.get_or_init(|| AuthConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        token_ttl_secs: 3600,
        recruiter: AccountConfig {
            username: "recruiter".to_string(),
            password_hash: Some(cheap_hash("recruiterpass")),
        },
        candidate: AccountConfig {
            username: "candidate".to_string(),
            password_hash: Some(cheap_hash("candidatepass")),
        },
    })
}

#[derive(Default)]
struct Tables {
    candidates: Vec<CandidateRow>,
    responses: Vec<ResponseRow>,
    trait_scores: Vec<TraitScoreRow>,
}

#[derive(Default)]
pub struct InMemoryAssessmentStore {
    tables: Mutex<Tables>,
}

impl InMemoryAssessmentStore {
    pub async fn response_count(&self) -> usize {
        self.tables.lock().await.responses.len()
    }

    pub async fn trait_score_count(&self) -> usize {
        self.tables.lock().await.trait_scores.len()
    }

    pub async fn candidate_count(&self) -> usize {
        self.tables.lock().await.candidates.len()
    }
}

#[async_trait]
impl AssessmentStore for InMemoryAssessmentStore {
    async fn create_candidate(
        &self,
        name: &str,
        session_token: &str,
    ) -> Result<CandidateRow, AppError> {
        let mut tables = self.tables.lock().await;
        if tables
            .candidates
            .iter()
            .any(|c| c.session_token == session_token)
        {
            return Err(AppError::Internal(anyhow::anyhow!(
                "duplicate session token"
            )));
        }
        let row = CandidateRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            session_token: session_token.to_string(),
            created_at: Utc::now(),
        };
        tables.candidates.push(row.clone());
        Ok(row)
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<CandidateRow>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_candidate(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        tables.candidates.retain(|c| c.id != id);
        tables.responses.retain(|r| r.candidate_id != id);
        tables.trait_scores.retain(|s| s.candidate_id != id);
        Ok(())
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateRow>, AppError> {
        Ok(self.tables.lock().await.candidates.clone())
    }

    async fn insert_response(
        &self,
        candidate_id: Uuid,
        question: &str,
        answer: &str,
    ) -> Result<ResponseRow, AppError> {
        let mut tables = self.tables.lock().await;
        let row = ResponseRow {
            id: Uuid::new_v4(),
            candidate_id,
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: Utc::now(),
        };
        tables.responses.push(row.clone());
        Ok(row)
    }

    async fn list_responses(&self, candidate_id: Uuid) -> Result<Vec<ResponseRow>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .responses
            .iter()
            .filter(|r| r.candidate_id == candidate_id)
            .cloned()
            .collect())
    }

    async fn insert_trait_scores(
        &self,
        candidate_id: Uuid,
        scores: &[(String, f64)],
    ) -> Result<Vec<TraitScoreRow>, AppError> {
        let mut tables = self.tables.lock().await;
        let rows: Vec<TraitScoreRow> = scores
            .iter()
            .map(|(trait_name, score)| TraitScoreRow {
                id: Uuid::new_v4(),
                candidate_id,
                trait_name: trait_name.clone(),
                score: *score,
                created_at: Utc::now(),
            })
            .collect();
        tables.trait_scores.extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn list_trait_scores(&self, candidate_id: Uuid) -> Result<Vec<TraitScoreRow>, AppError> {
        self.list_trait_scores_for(&[candidate_id]).await
    }

    async fn list_trait_scores_for(
        &self,
        candidate_ids: &[Uuid],
    ) -> Result<Vec<TraitScoreRow>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .trait_scores
            .iter()
            .filter(|s| candidate_ids.contains(&s.candidate_id))
            .cloned()
            .collect())
    }

    async fn trait_averages(&self, traits: &[&str]) -> Result<Vec<(String, Option<f64>)>, AppError> {
        let tables = self.tables.lock().await;
        Ok(traits
            .iter()
            .map(|name| {
                let scores: Vec<f64> = tables
                    .trait_scores
                    .iter()
                    .filter(|s| s.trait_name == *name)
                    .map(|s| s.score)
                    .collect();
                let average =
                    (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);
                (name.to_string(), average)
            })
            .collect())
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Uuid>>,
}

impl InMemorySessionStore {
    /// Simulates TTL expiry of a session key.
    pub async fn expire(&self, token: &str) {
        self.sessions.lock().await.remove(token);
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn bind(&self, token: &str, candidate_id: Uuid) -> Result<(), AppError> {
        self.sessions
            .lock()
            .await
            .insert(token.to_string(), candidate_id);
        Ok(())
    }

    async fn resolve(&self, token: &str) -> Result<Option<Uuid>, AppError> {
        Ok(self.sessions.lock().await.get(token).copied())
    }
}

/// A session store whose writes always fail, as when Redis is unreachable.
pub struct UnavailableSessionStore;

#[async_trait]
impl SessionStore for UnavailableSessionStore {
    async fn bind(&self, _token: &str, _candidate_id: Uuid) -> Result<(), AppError> {
        Err(AppError::Internal(anyhow::anyhow!("session store unavailable")))
    }

    async fn resolve(&self, _token: &str) -> Result<Option<Uuid>, AppError> {
        Ok(None)
    }
}

/// A full router over in-memory stores, with the LLM pointed at a mock server.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryAssessmentStore>,
    pub sessions: Arc<InMemorySessionStore>,
    pub llm: MockServer,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let sessions = Arc::new(InMemorySessionStore::default());
        Self::build(sessions.clone(), sessions).await
    }

    /// Routes session traffic to `session_store` instead of the in-memory map.
    pub async fn with_session_store(session_store: Arc<dyn SessionStore>) -> Self {
        Self::build(Arc::new(InMemorySessionStore::default()), session_store).await
    }

    async fn build(
        sessions: Arc<InMemorySessionStore>,
        session_store: Arc<dyn SessionStore>,
    ) -> Self {
        let llm = MockServer::start().await;
        let store = Arc::new(InMemoryAssessmentStore::default());

        let state = AppState {
            store: store.clone(),
            sessions: session_store,
            llm: client_for(&llm.uri()),
            auth: Arc::new(Authenticator::from_config(test_auth_config())),
        };

        Self {
            router: build_router(state.clone()),
            state,
            store,
            sessions,
            llm,
        }
    }

    pub fn token(&self, role: Role) -> String {
        self.state
            .auth
            .issue_token(&role.to_string(), role)
            .unwrap()
            .access_token
    }

    /// Sends a request and returns the status, headers and raw body.
    pub async fn raw_request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }

    /// Sends a request and parses the body as JSON (`Value::Null` when empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, bytes) = self.raw_request(method, uri, token, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    /// Logs in through `/start` as the candidate and returns the session token.
    pub async fn start_session(&self, name: &str) -> String {
        let token = self.token(Role::Candidate);
        let (status, body) = self
            .request(
                Method::POST,
                "/start",
                Some(&token),
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "start failed: {body}");
        body["session_id"].as_str().unwrap().to_string()
    }

    /// Resolves a session token straight from the session store.
    pub async fn candidate_id(&self, session_id: &str) -> Uuid {
        self.sessions.resolve(session_id).await.unwrap().unwrap()
    }
}
