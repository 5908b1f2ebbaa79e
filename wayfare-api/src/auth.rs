use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json,
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use wayfare_core::store::UserRecord;

use crate::{error::AppError, middleware::auth::Claims, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    username: String,
    email: String,
    password: String,
    confirm_password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
    #[serde(default)]
    remember: bool,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

// ============================================================================
// Helpers shared with the profile handlers
// ============================================================================

pub(crate) fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

pub(crate) fn valid_email(email: &str) -> bool {
    email.contains('@') && email.contains('.')
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/auth/register
/// Create an account
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();

    // 1. Validate, in the same order the checks are reported to the user
    if username.len() < 3 {
        return Err(AppError::ValidationError(
            "Username must be at least 3 characters long".to_string(),
        ));
    }
    if state.store.user_exists(&username).await? {
        return Err(AppError::ConflictError("Username already exists".to_string()));
    }
    if !valid_email(&email) {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }
    if state.store.email_exists(&email).await? {
        return Err(AppError::ConflictError("Email already registered".to_string()));
    }
    if req.password.len() < 6 {
        return Err(AppError::ValidationError(
            "Password must be at least 6 characters long".to_string(),
        ));
    }
    if req.password != req.confirm_password {
        return Err(AppError::ValidationError("Passwords do not match".to_string()));
    }

    // 2. Persist with the salted credential hash
    let record = UserRecord {
        username: username.clone(),
        email,
        password_hash: hash_password(&req.password, &state.auth.password_salt),
        created_at: Utc::now(),
    };
    state.store.create_user(&record).await?;

    tracing::info!("Registered user {}", username);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "User registered successfully" })),
    ))
}

/// POST /v1/auth/login
/// Verify credentials and issue a bearer token
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let username = req.username.trim().to_string();

    // 1. Look up the account
    let user = state
        .store
        .get_user(&username)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("Username not found".to_string()))?;

    // 2. Compare salted hashes
    if user.password_hash != hash_password(&req.password, &state.auth.password_salt) {
        return Err(AppError::AuthenticationError("Invalid password".to_string()));
    }

    // 3. Issue the token; "remember" stretches the lifetime
    let lifetime = if req.remember {
        state.auth.remember_expiration
    } else {
        state.auth.expiration
    };
    let my_claims = Claims {
        sub: username,
        email: user.email,
        exp: (Utc::now() + Duration::seconds(lifetime as i64)).timestamp() as usize,
    };

    let token = encode(&Header::default(), &my_claims, &EncodingKey::from_secret(state.auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse { token }))
}
