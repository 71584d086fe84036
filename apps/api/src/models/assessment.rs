use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "session_id")]
    pub session_token: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResponseRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

/// One (trait, score) observation. Rows are never updated; history accumulates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TraitScoreRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub score: f64,
    pub created_at: DateTime<Utc>,
}
