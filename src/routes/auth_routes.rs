use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{generate_access_token, hash_access_token, hash_password, verify_password},
    error::{ApiError, map_user_insert_err},
    middleware::auth_context::AuthContext,
    models::{ROLE_PATIENT, role_to_string, *},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        // Patient self-registration; the only unauthenticated write.
        .route("/register", post(register))
        .route("/me", get(me))
        .route("/logout", post(logout))
        .route("/change_password", post(change_password))
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "username is required".into(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "password is required".into(),
        ));
    }
    Ok(())
}

fn validate_full_name(full_name: &str) -> Result<(), ApiError> {
    if full_name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "full_name is required".into(),
        ));
    }
    Ok(())
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = req.username.trim();
    validate_username(username)?;
    validate_password(&req.password)?;

    let user: UserRow = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT user_id, username, password_hash, role, is_active
        FROM "cabs_user"
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?
    .ok_or_else(ApiError::invalid_credentials)?;

    if !user.is_active {
        return Err(ApiError::Forbidden(
            "FORBIDDEN",
            "Account is disabled".into(),
        ));
    }

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::invalid_credentials());
    }

    let access_token = generate_access_token();
    let token_hash = hash_access_token(&access_token);
    let expires_at = Utc::now() + Duration::hours(state.session_ttl_hours);

    let session: SessionTokenRow = sqlx::query_as::<_, SessionTokenRow>(
        r#"
        INSERT INTO session_token (user_id, session_token_hash, device_name, expires_at)
        VALUES ($1, $2, $3, $4)
        RETURNING session_token_id, expires_at
        "#,
    )
    .bind(user.user_id)
    .bind(&token_hash)
    .bind(req.device_name.as_deref())
    .bind(expires_at)
    .fetch_one(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    Ok(Json(LoginResponse {
        data: LoginResponseData {
            access_token,
            expires_at: session.expires_at,
            user: UserProfile {
                user_id: user.user_id,
                username: user.username,
                role: role_to_string(user.role),
            },
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub contact_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub data: RegisterResponseData,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponseData {
    pub patient_id: Uuid,
    pub user: UserProfile,
}

/// Creates the user and its patient row as one unit: a failure on either
/// insert rolls both back, so a taken username leaves nothing behind.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    validate_username(&req.username)?;
    validate_password(&req.password)?;
    validate_full_name(&req.full_name)?;

    let username = req.username.trim().to_string();
    let full_name = req.full_name.trim().to_string();

    let password_hash = hash_password(&req.password).map_err(ApiError::Internal)?;

    let mut tx = state
        .db
        .begin()
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    let user_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO "cabs_user" (username, password_hash, role)
        VALUES ($1, $2, $3)
        RETURNING user_id
        "#,
    )
    .bind(&username)
    .bind(&password_hash)
    .bind(ROLE_PATIENT)
    .fetch_one(&mut *tx)
    .await
    .map_err(map_user_insert_err)?;

    let patient_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO patient (user_id, full_name, contact_number)
        VALUES ($1, $2, $3)
        RETURNING patient_id
        "#,
    )
    .bind(user_id)
    .bind(&full_name)
    .bind(req.contact_number.as_deref())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    tx.commit()
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    Ok(Json(RegisterResponse {
        data: RegisterResponseData {
            patient_id,
            user: UserProfile {
                user_id,
                username,
                role: role_to_string(ROLE_PATIENT),
            },
        },
    }))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<MeResponse>, ApiError> {
    let user: UserRow = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT user_id, username, password_hash, role, is_active
        FROM "cabs_user"
        WHERE user_id = $1
          AND is_active = true
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?
    .ok_or_else(ApiError::session_expired)?;

    let session: SessionTokenRow = sqlx::query_as::<_, SessionTokenRow>(
        r#"
        SELECT session_token_id, expires_at
        FROM session_token
        WHERE session_token_id = $1
          AND user_id = $2
          AND revoked_at IS NULL
          AND expires_at > now()
        "#,
    )
    .bind(auth.session_token_id)
    .bind(auth.user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?
    .ok_or_else(ApiError::session_expired)?;

    Ok(Json(MeResponse {
        data: MeResponseData {
            user: UserProfile {
                user_id: user.user_id,
                username: user.username,
                role: role_to_string(user.role),
            },
            session: SessionInfo {
                session_token_id: session.session_token_id,
                expires_at: session.expires_at,
            },
        },
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<OkResponse>, ApiError> {
    let rows = sqlx::query(
        r#"
        UPDATE session_token
        SET revoked_at = now()
        WHERE session_token_id = $1
          AND user_id = $2
          AND revoked_at IS NULL
        "#,
    )
    .bind(auth.session_token_id)
    .bind(auth.user_id)
    .execute(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    if rows.rows_affected() == 0 {
        return Err(ApiError::session_expired());
    }

    Ok(Json(OkResponse {
        data: OkData { ok: true },
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    validate_password(&req.new_password)?;

    let row: (String,) = sqlx::query_as(
        r#"
        SELECT password_hash
        FROM "cabs_user"
        WHERE user_id = $1
          AND is_active = true
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?
    .ok_or_else(ApiError::session_expired)?;

    // Use invalid_credentials to avoid leaking which part was wrong
    if !verify_password(&req.old_password, &row.0) {
        return Err(ApiError::invalid_credentials());
    }

    let new_hash = hash_password(&req.new_password).map_err(ApiError::Internal)?;

    // Transaction so the hash swap and the session revocations land together
    let mut tx = state
        .db
        .begin()
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    sqlx::query(
        r#"
        UPDATE "cabs_user"
        SET password_hash = $1
        WHERE user_id = $2
        "#,
    )
    .bind(&new_hash)
    .bind(auth.user_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    // Revoke all OTHER active sessions (keep current)
    sqlx::query(
        r#"
        UPDATE session_token
        SET revoked_at = now()
        WHERE user_id = $1
          AND revoked_at IS NULL
          AND expires_at > now()
          AND session_token_id <> $2
        "#,
    )
    .bind(auth.user_id)
    .bind(auth.session_token_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    tx.commit()
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    Ok(Json(OkResponse {
        data: OkData { ok: true },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter2").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_full_name() {
        assert!(validate_full_name("Alice Wong").is_ok());
        assert!(validate_full_name("  ").is_err());
    }
}
