//! Candidate-facing feedback: a short natural-language summary of the latest
//! trait scores, as JSON or as a downloadable PDF.

pub mod handlers;
pub mod prompts;
