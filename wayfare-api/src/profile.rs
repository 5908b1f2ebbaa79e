use axum::{
    extract::State,
    routing::{get, put},
    Extension,
    Json,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wayfare_core::store::UserUpdate;

use crate::auth::{hash_password, valid_email};
use crate::{error::AppError, middleware::auth::Claims, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ProfileResponse {
    username: String,
    email: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct UpdateProfileRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
    confirm_password: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/profile", get(get_profile).put(update_profile))
        .route("/v1/profile/password", put(change_password))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/profile
/// Account details for the authenticated user
async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state
        .store
        .get_user(&claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        username: user.username,
        email: user.email,
        created_at: user.created_at,
    }))
}

/// PUT /v1/profile
/// Change the account e-mail address
async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let email = req.email.trim().to_string();

    if !valid_email(&email) {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }

    let user = state
        .store
        .get_user(&claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

    // Only cross-check ownership when the address actually changes
    if email != user.email && state.store.email_exists_for_other_user(&email, &claims.sub).await? {
        return Err(AppError::ConflictError(
            "Email already in use by another account".to_string(),
        ));
    }

    let update = UserUpdate {
        email: Some(email),
        ..Default::default()
    };
    state.store.update_user(&claims.sub, update).await?;

    Ok(Json(serde_json::json!({ "message": "Profile updated successfully" })))
}

/// PUT /v1/profile/password
/// Change the account password
async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if req.current_password.is_empty() || req.new_password.is_empty() {
        return Err(AppError::ValidationError(
            "Please fill in all password fields".to_string(),
        ));
    }

    let user = state
        .store
        .get_user(&claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

    if user.password_hash != hash_password(&req.current_password, &state.auth.password_salt) {
        return Err(AppError::ValidationError(
            "Current password is incorrect".to_string(),
        ));
    }
    if req.new_password.len() < 6 {
        return Err(AppError::ValidationError(
            "New password must be at least 6 characters long".to_string(),
        ));
    }
    if req.new_password != req.confirm_password {
        return Err(AppError::ValidationError("New passwords do not match".to_string()));
    }

    let update = UserUpdate {
        password_hash: Some(hash_password(&req.new_password, &state.auth.password_salt)),
        ..Default::default()
    };
    state.store.update_user(&claims.sub, update).await?;

    Ok(Json(serde_json::json!({ "message": "Password changed successfully" })))
}
