use anyhow::{bail, Context, Result};

const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_LLM_MODEL: &str = "openai/gpt-4";
const MIN_JWT_SECRET_LEN: usize = 32;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub llm: LlmConfig,
    pub auth: AuthConfig,
    /// Lifetime of a `session:<token>` key in Redis.
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

/// Settings for the OpenRouter chat-completion client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Retries after the first attempt; 0 disables retrying.
    pub max_retries: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub recruiter: AccountConfig,
    pub candidate: AccountConfig,
}

/// One login account. The account is disabled when `password_hash` is `None`.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    pub username: String,
    pub password_hash: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let jwt_secret = require_env("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes long");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            llm: LlmConfig {
                api_key: require_env("OPENROUTER_API_KEY")?,
                base_url: optional_env("OPENROUTER_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
                model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                timeout_secs: parse_env("LLM_TIMEOUT_SECS", 60)?,
                max_retries: parse_env("LLM_MAX_RETRIES", 3)?,
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_secs: parse_env("TOKEN_TTL_SECS", 86_400)?,
                recruiter: AccountConfig {
                    username: optional_env("RECRUITER_USERNAME")
                        .unwrap_or_else(|| "recruiter".to_string()),
                    password_hash: optional_env("RECRUITER_PASSWORD_HASH"),
                },
                candidate: AccountConfig {
                    username: optional_env("CANDIDATE_USERNAME")
                        .unwrap_or_else(|| "candidate".to_string()),
                    password_hash: optional_env("CANDIDATE_PASSWORD_HASH"),
                },
            },
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 604_800)?,
            port: parse_env("PORT", 5000)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
