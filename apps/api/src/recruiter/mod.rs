//! Recruiter-only views across all candidates.

pub mod handlers;
