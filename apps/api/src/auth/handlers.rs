use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{AuthError, Role};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let Ok(role) = req.role.parse::<Role>() else {
        warn!("Failed login attempt for username '{}' with unknown role", req.username);
        return Err(invalid());
    };

    // Argon2 verification is CPU-bound; keep it off the async workers.
    let auth = Arc::clone(&state.auth);
    let username = req.username.clone();
    let issued = tokio::task::spawn_blocking(move || auth.login(&username, &req.password, role))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("login task failed: {e}")))?;

    match issued {
        Ok(issued) => {
            info!("User '{}' logged in as '{role}'", req.username);
            Ok(Json(LoginResponse {
                access_token: issued.access_token,
                token_type: "Bearer",
                expires_in: issued.expires_in,
            }))
        }
        Err(AuthError::InvalidCredentials) => {
            warn!(
                "Failed login attempt for username '{}' and role '{role}'",
                req.username
            );
            Err(invalid())
        }
        Err(e) => Err(AppError::Internal(e.into())),
    }
}
