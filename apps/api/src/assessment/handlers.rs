use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::assessment::analysis::{analyze_response, AnalysisBody};
use crate::assessment::prompts::{ANSWER_SEPARATOR, NEXT_QUESTION_PROMPT};
use crate::assessment::session::{generate_session_token, is_plausible_token};
use crate::auth::extractor::AuthClaims;
use crate::auth::Role;
use crate::errors::AppError;
use crate::llm_client::prompts::{PLAIN_TEXT_INSTRUCTION, PSYCHOLOGIST_SYSTEM};
use crate::models::assessment::TraitScoreRow;
use crate::state::AppState;

const MAX_NAME_LEN: usize = 120;
const MAX_ANSWER_LEN: usize = 10_000;
const MAX_QUESTION_LEN: usize = 2_000;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub session_id: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub analysis: AnalysisBody,
}

#[derive(Debug, Deserialize)]
pub struct NextQuestionRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct NextQuestionResponse {
    pub next_question: String,
}

/// Maps a session token to its candidate id, or 404.
pub async fn resolve_session(state: &AppState, session_id: &str) -> Result<Uuid, AppError> {
    if is_plausible_token(session_id) {
        if let Some(candidate_id) = state.sessions.resolve(session_id).await? {
            return Ok(candidate_id);
        }
    }
    warn!("Invalid session_id '{session_id}'");
    Err(AppError::invalid_session())
}

fn require_text(field: &str, value: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /start
///
/// Creates a candidate and binds a fresh session token to it.
pub async fn handle_start(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(req): Json<StartRequest>,
) -> Result<Json<StartResponse>, AppError> {
    claims.require(Role::Candidate)?;
    let name = req.name.trim();
    require_text("name", name, MAX_NAME_LEN)?;

    let session_id = generate_session_token();
    let candidate = state.store.create_candidate(name, &session_id).await?;

    // A candidate whose token never resolves is unreachable; drop it.
    if let Err(e) = state.sessions.bind(&session_id, candidate.id).await {
        warn!(
            "Session bind failed for candidate {}; removing the candidate row",
            candidate.id
        );
        state.store.delete_candidate(candidate.id).await?;
        return Err(e);
    }

    info!(
        "Started assessment for candidate {} with a new session",
        candidate.id
    );
    Ok(Json(StartResponse { session_id }))
}

/// POST /submit
///
/// Stores the answer, then asks the LLM to score it. Analysis failures are
/// reported in the body; the stored answer is kept either way.
pub async fn handle_submit(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    claims.require(Role::Candidate)?;
    let candidate_id = resolve_session(&state, &req.session_id).await?;
    require_text("question", &req.question, MAX_QUESTION_LEN)?;
    require_text("answer", &req.answer, MAX_ANSWER_LEN)?;

    state
        .store
        .insert_response(candidate_id, &req.question, &req.answer)
        .await?;
    info!("Stored response for candidate {candidate_id}");

    let outcome = analyze_response(&state.llm, &req.answer).await;

    match &outcome {
        Ok(analysis) => {
            let scores = analysis.persistable_scores();
            if !scores.is_empty() {
                state
                    .store
                    .insert_trait_scores(candidate_id, &scores)
                    .await?;
            }
            info!(
                "Stored {} trait scores for candidate {candidate_id}",
                scores.len()
            );
        }
        Err(failure) => warn!(
            "Analysis error for candidate {candidate_id}: {}",
            failure.message()
        ),
    }

    Ok(Json(SubmitResponse {
        analysis: outcome.into(),
    }))
}

/// GET /profile/:session_id
///
/// Full trait score history for the session's candidate, oldest first.
pub async fn handle_profile(
    State(state): State<AppState>,
    _claims: AuthClaims,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<TraitScoreRow>>, AppError> {
    let candidate_id = resolve_session(&state, &session_id).await?;
    let scores = state.store.list_trait_scores(candidate_id).await?;
    info!("Fetched profile for candidate {candidate_id}");
    Ok(Json(scores))
}

/// POST /generate-question
///
/// Asks the LLM for the next behavioural question given all previous answers.
pub async fn handle_generate_question(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(req): Json<NextQuestionRequest>,
) -> Result<Json<NextQuestionResponse>, AppError> {
    claims.require(Role::Candidate)?;
    let candidate_id = resolve_session(&state, &req.session_id).await?;

    let past_responses = state.store.list_responses(candidate_id).await?;
    let context = past_responses
        .iter()
        .map(|r| r.answer.as_str())
        .collect::<Vec<_>>()
        .join(ANSWER_SEPARATOR);

    let prompt = format!(
        "{} {PLAIN_TEXT_INSTRUCTION}",
        NEXT_QUESTION_PROMPT.replace("{context}", &context)
    );
    let next_question = state
        .llm
        .call_text(&prompt, PSYCHOLOGIST_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Question generation failed: {e}")))?;

    info!("Generated question for candidate {candidate_id}");
    Ok(Json(NextQuestionResponse { next_question }))
}
