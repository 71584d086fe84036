//! Trait analysis of a single candidate answer.
//!
//! The model is asked for a JSON object with `BigFive` and `MBTI` maps.
//! Failures never become HTTP errors: the submit handler reports them inside
//! the analysis body and keeps the stored response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::assessment::prompts::ANALYSIS_PROMPT;
use crate::llm_client::prompts::PSYCHOLOGIST_SYSTEM;
use crate::llm_client::LlmClient;

/// Longest trait name the `trait_scores.trait_name` column accepts.
pub const MAX_TRAIT_NAME_LEN: usize = 50;

/// Parsed model output. Either map may be missing from the response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalityAnalysis {
    #[serde(rename = "BigFive", default)]
    pub big_five: BTreeMap<String, f64>,
    #[serde(rename = "MBTI", default)]
    pub mbti: BTreeMap<String, f64>,
}

impl PersonalityAnalysis {
    /// The `(trait, score)` pairs that become TraitScore rows: every `BigFive` entry
    /// with a usable trait name. MBTI values are returned to the caller but not stored.
    pub fn persistable_scores(&self) -> Vec<(String, f64)> {
        self.big_five
            .iter()
            .filter(|(name, score)| {
                let usable = !name.trim().is_empty()
                    && name.chars().count() <= MAX_TRAIT_NAME_LEN
                    && score.is_finite();
                if !usable {
                    warn!("Skipping unusable trait score '{name}' = {score}");
                }
                usable
            })
            .map(|(name, score)| (name.clone(), *score))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisFailure {
    /// The provider could not be reached or answered with an error status.
    Upstream,
    /// The provider answered but the content was not the expected JSON object.
    Parse,
}

impl AnalysisFailure {
    pub fn message(self) -> &'static str {
        match self {
            AnalysisFailure::Upstream => "Failed to query LLM",
            AnalysisFailure::Parse => "Failed to parse LLM response",
        }
    }
}

/// What `/submit` returns under `"analysis"`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisBody {
    Scored(PersonalityAnalysis),
    Failed { error: String },
}

impl From<Result<PersonalityAnalysis, AnalysisFailure>> for AnalysisBody {
    fn from(outcome: Result<PersonalityAnalysis, AnalysisFailure>) -> Self {
        match outcome {
            Ok(analysis) => AnalysisBody::Scored(analysis),
            Err(failure) => AnalysisBody::Failed {
                error: failure.message().to_string(),
            },
        }
    }
}

/// Asks the model to score one answer.
pub async fn analyze_response(
    llm: &LlmClient,
    answer: &str,
) -> Result<PersonalityAnalysis, AnalysisFailure> {
    let prompt = ANALYSIS_PROMPT.replace("{answer}", answer);

    info!("Sending answer to LLM for trait analysis");
    match llm
        .call_json::<PersonalityAnalysis>(&prompt, PSYCHOLOGIST_SYSTEM)
        .await
    {
        Ok(analysis) => {
            info!(
                "Parsed LLM analysis: {} Big Five, {} MBTI values",
                analysis.big_five.len(),
                analysis.mbti.len()
            );
            Ok(analysis)
        }
        Err(e) if e.is_parse_failure() => {
            error!("Failed to parse LLM response: {e}");
            Err(AnalysisFailure::Parse)
        }
        Err(e) => {
            error!("Error querying LLM: {e}");
            Err(AnalysisFailure::Upstream)
        }
    }
}
