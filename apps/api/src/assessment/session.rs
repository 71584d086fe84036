//! Session token -> candidate id mapping.
//!
//! Tokens are opaque UUID strings handed out by `/start`. The Redis entry
//! expires after the configured TTL; after that the token resolves to nothing
//! and callers answer 404.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;

const SESSION_PREFIX: &str = "session:";

/// Tokens longer than this are rejected without a store lookup.
pub const MAX_SESSION_TOKEN_LEN: usize = 256;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn bind(&self, token: &str, candidate_id: Uuid) -> Result<(), AppError>;

    async fn resolve(&self, token: &str) -> Result<Option<Uuid>, AppError>;
}

/// Generates a fresh session token.
pub fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

/// Cheap shape check performed before touching the store.
pub fn is_plausible_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_SESSION_TOKEN_LEN
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn session_key(token: &str) -> String {
    format!("{SESSION_PREFIX}{token}")
}

#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn bind(&self, token: &str, candidate_id: Uuid) -> Result<(), AppError> {
        let mut redis = self.redis.clone();
        redis
            .set_ex::<_, _, ()>(session_key(token), candidate_id.to_string(), self.ttl_secs)
            .await?;
        Ok(())
    }

    async fn resolve(&self, token: &str) -> Result<Option<Uuid>, AppError> {
        let mut redis = self.redis.clone();
        let value = redis.get::<_, Option<String>>(session_key(token)).await?;

        Ok(value.and_then(|raw| match Uuid::parse_str(&raw) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Session entry holds a malformed candidate id: {e}");
                None
            }
        }))
    }
}
