//! Relational persistence for candidates, responses and trait scores.
//!
//! `AppState` holds an `Arc<dyn AssessmentStore>`; production uses
//! `PgAssessmentStore`. Every list operation returns rows oldest first.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::assessment::{CandidateRow, ResponseRow, TraitScoreRow};

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn create_candidate(
        &self,
        name: &str,
        session_token: &str,
    ) -> Result<CandidateRow, AppError>;

    async fn get_candidate(&self, id: Uuid) -> Result<Option<CandidateRow>, AppError>;

    /// Removes a candidate and, through the foreign keys, its history.
    async fn delete_candidate(&self, id: Uuid) -> Result<(), AppError>;

    async fn list_candidates(&self) -> Result<Vec<CandidateRow>, AppError>;

    async fn insert_response(
        &self,
        candidate_id: Uuid,
        question: &str,
        answer: &str,
    ) -> Result<ResponseRow, AppError>;

    async fn list_responses(&self, candidate_id: Uuid) -> Result<Vec<ResponseRow>, AppError>;

    /// Appends one row per `(trait, score)` pair, all or nothing.
    async fn insert_trait_scores(
        &self,
        candidate_id: Uuid,
        scores: &[(String, f64)],
    ) -> Result<Vec<TraitScoreRow>, AppError>;

    async fn list_trait_scores(&self, candidate_id: Uuid) -> Result<Vec<TraitScoreRow>, AppError>;

    /// Score history for several candidates at once; unknown ids contribute nothing.
    async fn list_trait_scores_for(
        &self,
        candidate_ids: &[Uuid],
    ) -> Result<Vec<TraitScoreRow>, AppError>;

    /// Mean of all stored scores for each requested trait, in request order.
    /// `None` when a trait has no scores.
    async fn trait_averages(&self, traits: &[&str]) -> Result<Vec<(String, Option<f64>)>, AppError>;
}

#[derive(Clone)]
pub struct PgAssessmentStore {
    pool: PgPool,
}

impl PgAssessmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssessmentStore for PgAssessmentStore {
    async fn create_candidate(
        &self,
        name: &str,
        session_token: &str,
    ) -> Result<CandidateRow, AppError> {
        let candidate = sqlx::query_as::<_, CandidateRow>(
            r#"
            INSERT INTO candidates (id, name, session_token)
            VALUES ($1, $2, $3)
            RETURNING id, name, session_token, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(session_token)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted candidate {}", candidate.id);
        Ok(candidate)
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<CandidateRow>, AppError> {
        Ok(sqlx::query_as::<_, CandidateRow>(
            "SELECT id, name, session_token, created_at FROM candidates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_candidate(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM candidates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!("Deleted candidate {id}");
        Ok(())
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateRow>, AppError> {
        Ok(sqlx::query_as::<_, CandidateRow>(
            "SELECT id, name, session_token, created_at FROM candidates ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_response(
        &self,
        candidate_id: Uuid,
        question: &str,
        answer: &str,
    ) -> Result<ResponseRow, AppError> {
        Ok(sqlx::query_as::<_, ResponseRow>(
            r#"
            INSERT INTO responses (id, candidate_id, question, answer)
            VALUES ($1, $2, $3, $4)
            RETURNING id, candidate_id, question, answer, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(question)
        .bind(answer)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_responses(&self, candidate_id: Uuid) -> Result<Vec<ResponseRow>, AppError> {
        Ok(sqlx::query_as::<_, ResponseRow>(
            r#"
            SELECT id, candidate_id, question, answer, created_at
            FROM responses
            WHERE candidate_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_trait_scores(
        &self,
        candidate_id: Uuid,
        scores: &[(String, f64)],
    ) -> Result<Vec<TraitScoreRow>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(scores.len());

        for (trait_name, score) in scores {
            let row = sqlx::query_as::<_, TraitScoreRow>(
                r#"
                INSERT INTO trait_scores (id, candidate_id, trait_name, score)
                VALUES ($1, $2, $3, $4)
                RETURNING id, candidate_id, trait_name, score, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(candidate_id)
            .bind(trait_name)
            .bind(score)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;
        info!(
            "Inserted {} trait scores for candidate {candidate_id}",
            rows.len()
        );
        Ok(rows)
    }

    async fn list_trait_scores(&self, candidate_id: Uuid) -> Result<Vec<TraitScoreRow>, AppError> {
        Ok(sqlx::query_as::<_, TraitScoreRow>(
            r#"
            SELECT id, candidate_id, trait_name, score, created_at
            FROM trait_scores
            WHERE candidate_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_trait_scores_for(
        &self,
        candidate_ids: &[Uuid],
    ) -> Result<Vec<TraitScoreRow>, AppError> {
        Ok(sqlx::query_as::<_, TraitScoreRow>(
            r#"
            SELECT id, candidate_id, trait_name, score, created_at
            FROM trait_scores
            WHERE candidate_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(candidate_ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn trait_averages(&self, traits: &[&str]) -> Result<Vec<(String, Option<f64>)>, AppError> {
        let names: Vec<String> = traits.iter().map(|t| t.to_string()).collect();
        let averages: Vec<(String, Option<f64>)> = sqlx::query_as(
            r#"
            SELECT trait_name, AVG(score)
            FROM trait_scores
            WHERE trait_name = ANY($1)
            GROUP BY trait_name
            "#,
        )
        .bind(&names)
        .fetch_all(&self.pool)
        .await?;

        Ok(names
            .into_iter()
            .map(|name| {
                let average = averages
                    .iter()
                    .find(|(t, _)| *t == name)
                    .and_then(|(_, avg)| *avg);
                (name, average)
            })
            .collect())
    }
}
