use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::assessment::handlers::resolve_session;
use crate::assessment::scores::latest_by_trait;
use crate::auth::extractor::AuthClaims;
use crate::auth::Role;
use crate::errors::AppError;
use crate::feedback::prompts::{FEEDBACK_PROMPT, NO_SCORES_SUMMARY};
use crate::llm_client::prompts::{PLAIN_TEXT_INSTRUCTION, PSYCHOLOGIST_SYSTEM};
use crate::report::{render_feedback_report, FeedbackReport};
use crate::state::AppState;

const PDF_FILENAME: &str = "feedback_report.pdf";

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback_summary: String,
    pub scores: BTreeMap<String, f64>,
}

/// Latest scores for the candidate plus a model-written summary of them.
async fn summarize(
    state: &AppState,
    candidate_id: Uuid,
) -> Result<FeedbackResponse, AppError> {
    let rows = state.store.list_trait_scores(candidate_id).await?;
    let scores = latest_by_trait(&rows);

    if scores.is_empty() {
        info!("No scores for candidate {candidate_id}; skipping LLM feedback");
        return Ok(FeedbackResponse {
            feedback_summary: NO_SCORES_SUMMARY.to_string(),
            scores,
        });
    }

    let scores_json = serde_json::to_string(&scores)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode scores: {e}")))?;
    let prompt = format!(
        "{} {PLAIN_TEXT_INSTRUCTION}",
        FEEDBACK_PROMPT.replace("{scores}", &scores_json)
    );

    let feedback_summary = state
        .llm
        .call_text(&prompt, PSYCHOLOGIST_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Feedback generation failed: {e}")))?;

    Ok(FeedbackResponse {
        feedback_summary,
        scores,
    })
}

/// GET /candidate/feedback/:session_id
pub async fn handle_feedback(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(session_id): Path<String>,
) -> Result<Json<FeedbackResponse>, AppError> {
    claims.require(Role::Candidate)?;
    let candidate_id = resolve_session(&state, &session_id).await?;

    let feedback = summarize(&state, candidate_id).await?;
    info!("Generated feedback for candidate {candidate_id}");
    Ok(Json(feedback))
}

/// GET /candidate/feedback-pdf/:session_id
///
/// Same content as `handle_feedback`, rendered as a PDF attachment.
pub async fn handle_feedback_pdf(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(session_id): Path<String>,
) -> Result<Response, AppError> {
    claims.require(Role::Candidate)?;
    let candidate_id = resolve_session(&state, &session_id).await?;

    let candidate = state
        .store
        .get_candidate(candidate_id)
        .await?
        .ok_or_else(AppError::invalid_session)?;

    let feedback = summarize(&state, candidate_id).await?;
    let report = FeedbackReport {
        candidate_name: candidate.name,
        summary: feedback.feedback_summary,
        scores: feedback.scores,
    };

    let pdf = tokio::task::spawn_blocking(move || render_feedback_report(&report))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Report task failed: {e}")))?
        .map_err(|e| AppError::Report(e.to_string()))?;

    info!("Generated PDF feedback for candidate {candidate_id}");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{PDF_FILENAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
