//! Login and role checks.
//!
//! Two accounts exist: one recruiter and one candidate. Usernames and Argon2
//! password hashes come from configuration; an account without a hash cannot
//! log in.

pub mod extractor;
pub mod handlers;
pub mod jwt;
pub mod password;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::jwt::{Claims, TokenKeys};
use crate::auth::password::check_password;
use crate::config::AuthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Recruiter,
    Candidate,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recruiter => write!(f, "recruiter"),
            Self::Candidate => write!(f, "candidate"),
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recruiter" => Ok(Self::Recruiter),
            "candidate" => Ok(Self::Candidate),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Stored password hash is unusable: {0}")]
    UnusableHash(String),
}

struct Account {
    username: String,
    role: Role,
    password_hash: Option<String>,
}

/// A freshly issued access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
}

pub struct Authenticator {
    accounts: Vec<Account>,
    keys: TokenKeys,
}

impl Authenticator {
    pub fn from_config(config: &AuthConfig) -> Self {
        let accounts = vec![
            Account {
                username: config.recruiter.username.clone(),
                role: Role::Recruiter,
                password_hash: config.recruiter.password_hash.clone(),
            },
            Account {
                username: config.candidate.username.clone(),
                role: Role::Candidate,
                password_hash: config.candidate.password_hash.clone(),
            },
        ];

        for account in accounts.iter().filter(|a| a.password_hash.is_none()) {
            warn!(
                "No password hash configured for {} account '{}'; login disabled",
                account.role, account.username
            );
        }

        Self {
            accounts,
            keys: TokenKeys::new(config.jwt_secret.as_bytes(), config.token_ttl_secs),
        }
    }

    /// Checks a username/password/role triple and issues a token on success.
    ///
    /// Runs an Argon2 verification; call from a blocking context.
    pub fn login(&self, username: &str, password: &str, role: Role) -> Result<IssuedToken, AuthError> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.username == username && a.role == role)
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = account
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;

        match check_password(password, hash) {
            Ok(()) => {}
            Err(AuthError::UnusableHash(reason)) => {
                warn!("Configured password hash for '{username}' is unusable: {reason}");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        }

        info!("Issuing {role} token for '{username}'");
        self.issue_token(username, role)
    }

    pub fn issue_token(&self, subject: &str, role: Role) -> Result<IssuedToken, AuthError> {
        Ok(IssuedToken {
            access_token: self.keys.issue(subject, role)?,
            expires_in: self.keys.ttl_secs(),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.keys.verify(token)
    }
}
