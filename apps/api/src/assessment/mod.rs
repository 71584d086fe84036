//! The candidate assessment flow: sessions, answers, LLM trait analysis and
//! the score history it produces.

pub mod analysis;
pub mod handlers;
pub mod prompts;
pub mod scores;
pub mod session;
pub mod store;
