use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::assessment::scores::{latest_by_trait, round2, BIG_FIVE_TRAITS};
use crate::auth::extractor::AuthClaims;
use crate::auth::Role;
use crate::errors::AppError;
use crate::models::assessment::CandidateRow;
use crate::state::AppState;

/// Upper bound on ids accepted by a single compare request.
pub const MAX_COMPARE_IDS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub candidate_ids: Vec<Uuid>,
}

/// GET /recruiter/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    claims: AuthClaims,
) -> Result<Json<Vec<CandidateRow>>, AppError> {
    claims.require(Role::Recruiter)?;
    let candidates = state.store.list_candidates().await?;
    info!("Listed {} candidates", candidates.len());
    Ok(Json(candidates))
}

/// POST /recruiter/compare
///
/// Latest score per trait for each requested candidate. Ids without any
/// scores, including unknown ids, map to an empty object.
pub async fn handle_compare(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(req): Json<CompareRequest>,
) -> Result<Json<BTreeMap<Uuid, BTreeMap<String, f64>>>, AppError> {
    claims.require(Role::Recruiter)?;

    let mut ids = req.candidate_ids;
    ids.sort();
    ids.dedup();

    if ids.is_empty() {
        return Err(AppError::Validation(
            "candidate_ids cannot be empty".to_string(),
        ));
    }
    if ids.len() > MAX_COMPARE_IDS {
        return Err(AppError::Validation(format!(
            "At most {MAX_COMPARE_IDS} candidates can be compared at once"
        )));
    }

    let rows = state.store.list_trait_scores_for(&ids).await?;

    let comparison = ids
        .iter()
        .map(|id| {
            let history: Vec<_> = rows
                .iter()
                .filter(|r| r.candidate_id == *id)
                .cloned()
                .collect();
            (*id, latest_by_trait(&history))
        })
        .collect();

    info!("Compared {} candidates", ids.len());
    Ok(Json(comparison))
}

/// GET /recruiter/trends
///
/// Mean score of each Big Five trait over every stored observation.
pub async fn handle_trends(
    State(state): State<AppState>,
    claims: AuthClaims,
) -> Result<Json<BTreeMap<String, Option<f64>>>, AppError> {
    claims.require(Role::Recruiter)?;

    let averages = state.store.trait_averages(&BIG_FIVE_TRAITS).await?;
    let trends = averages
        .into_iter()
        .map(|(name, avg)| (name, avg.map(round2)))
        .collect();

    Ok(Json(trends))
}
