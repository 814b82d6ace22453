// src/routes/doctor_routes.rs

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::hash_password,
    error::{ApiError, map_user_insert_err},
    middleware::auth_context::AuthContext,
    models::{AppState, DoctorRow, ROLE_ADMIN, ROLE_DOCTOR},
};

fn ensure_admin(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.role == ROLE_ADMIN {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "FORBIDDEN",
            "Only admin can manage doctors".into(),
        ))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        // GET  /api/v1/doctors  -> listing, also feeds the booking form
        // POST /api/v1/doctors  -> admin adds a doctor account + profile
        .route("/", get(list_doctors).post(add_doctor))
}

#[derive(Debug, Serialize)]
pub struct DoctorsListResponse {
    pub data: DoctorsListData,
}

#[derive(Debug, Serialize)]
pub struct DoctorsListData {
    pub doctors: Vec<DoctorRow>,
}

/// Every doctor, unfiltered: there is no availability model, the booking
/// form simply offers the full roster.
pub async fn list_doctors(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<DoctorsListResponse>, ApiError> {
    let doctors: Vec<DoctorRow> = sqlx::query_as::<_, DoctorRow>(
        r#"
        SELECT doctor_id, full_name, specialization
        FROM doctor
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    Ok(Json(DoctorsListResponse {
        data: DoctorsListData { doctors },
    }))
}

#[derive(Debug, Deserialize)]
pub struct AddDoctorRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub specialization: String,
}

#[derive(Debug, Serialize)]
pub struct AddDoctorResponse {
    pub data: DoctorRow,
}

fn validate_add_doctor(req: &AddDoctorRequest) -> Result<(), ApiError> {
    for (field, value) in [
        ("username", req.username.trim()),
        ("full_name", req.full_name.trim()),
        ("specialization", req.specialization.trim()),
    ] {
        if value.is_empty() {
            return Err(ApiError::BadRequest(
                "VALIDATION_ERROR",
                format!("{field} is required"),
            ));
        }
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            "password is required".into(),
        ));
    }
    Ok(())
}

/// User + doctor rows are written in one transaction: a username collision
/// (or any later failure) leaves no orphaned account behind.
pub async fn add_doctor(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<AddDoctorRequest>,
) -> Result<Json<AddDoctorResponse>, ApiError> {
    ensure_admin(&auth)?;
    validate_add_doctor(&req)?;

    let username = req.username.trim().to_string();
    let full_name = req.full_name.trim().to_string();
    let specialization = req.specialization.trim().to_string();

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
    .bind(ROLE_DOCTOR)
    .fetch_one(&mut *tx)
    .await
    .map_err(map_user_insert_err)?;

    let doctor: DoctorRow = sqlx::query_as::<_, DoctorRow>(
        r#"
        INSERT INTO doctor (user_id, full_name, specialization)
        VALUES ($1, $2, $3)
        RETURNING doctor_id, full_name, specialization
        "#,
    )
    .bind(user_id)
    .bind(&full_name)
    .bind(&specialization)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    tx.commit()
        .await
        .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    Ok(Json(AddDoctorResponse { data: doctor }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ROLE_PATIENT;

    fn ctx(role: i16) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            role,
            session_token_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn only_admin_passes_the_guard() {
        assert!(ensure_admin(&ctx(ROLE_ADMIN)).is_ok());
        assert!(ensure_admin(&ctx(ROLE_PATIENT)).is_err());
        assert!(ensure_admin(&ctx(ROLE_DOCTOR)).is_err());
    }

    #[test]
    fn add_doctor_rejects_blank_fields() {
        let ok = AddDoctorRequest {
            username: "drlee".into(),
            password: "pw".into(),
            full_name: "Dr. Lee".into(),
            specialization: "Cardiology".into(),
        };
        assert!(validate_add_doctor(&ok).is_ok());

        let blank_name = AddDoctorRequest {
            username: "drlee".into(),
            password: "pw".into(),
            full_name: "  ".into(),
            specialization: "Cardiology".into(),
        };
        assert!(validate_add_doctor(&blank_name).is_err());

        let no_password = AddDoctorRequest {
            username: "drlee".into(),
            password: String::new(),
            full_name: "Dr. Lee".into(),
            specialization: "Cardiology".into(),
        };
        assert!(validate_add_doctor(&no_password).is_err());
    }
}
