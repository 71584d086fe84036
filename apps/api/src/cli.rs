use clap::{Parser, Subcommand};

/// Persona API - personality assessment backend
#[derive(Parser)]
#[command(name = "persona_api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the server (default)
    Serve,

    /// Print an Argon2 hash for RECRUITER_PASSWORD_HASH / CANDIDATE_PASSWORD_HASH
    HashPassword {
        /// Plain-text password to hash
        password: String,
    },
}
