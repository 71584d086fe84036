// Feedback LLM prompt templates.

pub const FEEDBACK_PROMPT: &str = "Based on the following personality trait scores: {scores}, \
generate a short natural-language summary of the candidate's strengths, weaknesses, and career fit. \
Respond in 4-5 sentences.";

/// Returned instead of calling the model when a candidate has no scores yet.
pub const NO_SCORES_SUMMARY: &str = "No personality trait scores have been recorded for this \
assessment yet. Answer a few questions to receive feedback.";
