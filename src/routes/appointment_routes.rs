// src/routes/appointment_routes.rs

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{
        APPOINTMENT_BOOKED, APPOINTMENT_CANCELLED, AppState, AppointmentRow, OkData, OkResponse,
        ROLE_ADMIN, ROLE_DOCTOR, ROLE_PATIENT,
    },
};

/*
Roles (cabs_user.role):
0 patient
1 admin
2 doctor
*/

fn ensure_admin(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.role == ROLE_ADMIN {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "FORBIDDEN",
            "Only admin can view all appointments".into(),
        ))
    }
}

fn ensure_patient(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.role == ROLE_PATIENT {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "FORBIDDEN",
            "Only patients can book or cancel appointments".into(),
        ))
    }
}

fn ensure_doctor(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.role == ROLE_DOCTOR {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "FORBIDDEN",
            "Only doctors can view their schedule".into(),
        ))
    }
}

fn parse_appointment_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest("VALIDATION_ERROR", "date must be YYYY-MM-DD".into())
    })
}

fn parse_appointment_time(raw: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| {
        ApiError::BadRequest("VALIDATION_ERROR", "time must be HH:MM".into())
    })
}

async fn resolve_patient_id_by_user_id(
    state: &AppState,
    user_id: Uuid,
) -> Result<Uuid, ApiError> {
    let patient_id: Option<Uuid> = sqlx::query_scalar(
        r#"
        SELECT patient_id
        FROM patient
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    patient_id.ok_or_else(|| {
        ApiError::BadRequest(
            "NO_PATIENT_PROFILE",
            "Patient account has no patient profile".into(),
        )
    })
}

async fn resolve_doctor_id_by_user_id(
    state: &AppState,
    user_id: Uuid,
) -> Result<Uuid, ApiError> {
    let doctor_id: Option<Uuid> = sqlx::query_scalar(
        r#"
        SELECT doctor_id
        FROM doctor
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    doctor_id.ok_or_else(|| {
        ApiError::BadRequest(
            "NO_DOCTOR_PROFILE",
            "Doctor account has no doctor profile".into(),
        )
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        // GET  /api/v1/appointments           -> admin: every appointment, joined names
        // POST /api/v1/appointments           -> patient books
        .route("/", get(list_all_appointments).post(book_appointment))
        .route("/{appointment_id}/cancel", post(cancel_appointment))
        // patient's own bookings
        .route("/mine", get(list_my_appointments))
        // doctor's own schedule
        .route("/schedule", get(list_doctor_schedule))
}

#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub data: T,
}

/* ============================================================
   POST /appointments  (patient books)
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: String,
    pub time: String,
}

/// No slot or double-booking model exists: any date/time for any doctor is
/// accepted. Doctor existence is enforced by the foreign key.
pub async fn book_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<BookAppointmentRequest>,
) -> Result<Json<ApiOk<AppointmentRow>>, ApiError> {
    ensure_patient(&auth)?;

    let date = parse_appointment_date(&req.date)?;
    let time = parse_appointment_time(&req.time)?;

    let patient_id = resolve_patient_id_by_user_id(&state, auth.user_id).await?;

    let appointment: AppointmentRow = sqlx::query_as::<_, AppointmentRow>(
        r#"
        INSERT INTO appointment (patient_id, doctor_id, appointment_date, appointment_time, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING appointment_id, patient_id, doctor_id, appointment_date, appointment_time, status
        "#,
    )
    .bind(patient_id)
    .bind(req.doctor_id)
    .bind(date)
    .bind(time)
    .bind(APPOINTMENT_BOOKED)
    .fetch_one(&state.db)
    .await
    .map_err(|e| ApiError::BadRequest("APPOINTMENT_CREATE_FAILED", format!("{e}")))?;

    Ok(Json(ApiOk { data: appointment }))
}

/* ============================================================
   POST /appointments/{id}/cancel
   ============================================================ */

/// Soft-cancel, scoped to the caller's own patient row. Cancelling an
/// already-cancelled appointment is a no-op success; an id that does not
/// belong to the caller reads as not found.
pub async fn cancel_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<OkResponse>, ApiError> {
    ensure_patient(&auth)?;

    let patient_id = resolve_patient_id_by_user_id(&state, auth.user_id).await?;

    let res = sqlx::query(
        r#"
        UPDATE appointment
        SET status = $1
        WHERE appointment_id = $2
          AND patient_id = $3
        "#,
    )
    .bind(APPOINTMENT_CANCELLED)
    .bind(appointment_id)
    .bind(patient_id)
    .execute(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    if res.rows_affected() == 0 {
        return Err(ApiError::NotFound(
            "NOT_FOUND",
            "appointment not found".into(),
        ));
    }

    Ok(Json(OkResponse {
        data: OkData { ok: true },
    }))
}

/* ============================================================
   GET /appointments  (admin overview)
   ============================================================ */

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AdminAppointmentItem {
    pub appointment_id: Uuid,
    pub patient_name: String,
    pub doctor_name: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: i16,
}

pub async fn list_all_appointments(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<Vec<AdminAppointmentItem>>>, ApiError> {
    ensure_admin(&auth)?;

    let rows: Vec<AdminAppointmentItem> = sqlx::query_as::<_, AdminAppointmentItem>(
        r#"
        SELECT
          a.appointment_id,
          p.full_name AS patient_name,
          d.full_name AS doctor_name,
          a.appointment_date,
          a.appointment_time,
          a.status
        FROM appointment a
        JOIN patient p ON p.patient_id = a.patient_id
        JOIN doctor d ON d.doctor_id = a.doctor_id
        ORDER BY a.appointment_date ASC, a.appointment_time ASC
        "#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    Ok(Json(ApiOk { data: rows }))
}

/* ============================================================
   GET /appointments/mine  (patient view)
   ============================================================ */

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PatientAppointmentItem {
    pub appointment_id: Uuid,
    pub doctor_name: String,
    pub specialization: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: i16,
}

pub async fn list_my_appointments(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<Vec<PatientAppointmentItem>>>, ApiError> {
    ensure_patient(&auth)?;

    let rows: Vec<PatientAppointmentItem> = sqlx::query_as::<_, PatientAppointmentItem>(
        r#"
        SELECT
          a.appointment_id,
          d.full_name AS doctor_name,
          d.specialization,
          a.appointment_date,
          a.appointment_time,
          a.status
        FROM appointment a
        JOIN doctor d ON d.doctor_id = a.doctor_id
        JOIN patient p ON p.patient_id = a.patient_id
        WHERE p.user_id = $1
        ORDER BY a.appointment_date ASC, a.appointment_time ASC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    Ok(Json(ApiOk { data: rows }))
}

/* ============================================================
   GET /appointments/schedule  (doctor view)
   ============================================================ */

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DoctorAppointmentItem {
    pub appointment_id: Uuid,
    pub patient_name: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: i16,
}

pub async fn list_doctor_schedule(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<Vec<DoctorAppointmentItem>>>, ApiError> {
    ensure_doctor(&auth)?;

    // Resolve through the doctor row so a dangling account fails loudly
    let doctor_id = resolve_doctor_id_by_user_id(&state, auth.user_id).await?;

    let rows: Vec<DoctorAppointmentItem> = sqlx::query_as::<_, DoctorAppointmentItem>(
        r#"
        SELECT
          a.appointment_id,
          p.full_name AS patient_name,
          a.appointment_date,
          a.appointment_time,
          a.status
        FROM appointment a
        JOIN patient p ON p.patient_id = a.patient_id
        WHERE a.doctor_id = $1
        ORDER BY a.appointment_date ASC, a.appointment_time ASC
        "#,
    )
    .bind(doctor_id)
    .fetch_all(&state.db)
    .await
    .map_err(|e| ApiError::Internal(format!("db error: {e}")))?;

    Ok(Json(ApiOk { data: rows }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: i16) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            role,
            session_token_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn guards_reject_other_roles() {
        assert!(ensure_patient(&ctx(ROLE_PATIENT)).is_ok());
        assert!(ensure_patient(&ctx(ROLE_ADMIN)).is_err());
        assert!(ensure_patient(&ctx(ROLE_DOCTOR)).is_err());

        assert!(ensure_doctor(&ctx(ROLE_DOCTOR)).is_ok());
        assert!(ensure_doctor(&ctx(ROLE_PATIENT)).is_err());

        assert!(ensure_admin(&ctx(ROLE_ADMIN)).is_ok());
        assert!(ensure_admin(&ctx(ROLE_PATIENT)).is_err());
    }

    #[test]
    fn date_parsing() {
        assert_eq!(
            parse_appointment_date("2024-01-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            parse_appointment_date("  2024-01-01  ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert!(parse_appointment_date("01/01/2024").is_err());
        assert!(parse_appointment_date("").is_err());
    }

    #[test]
    fn time_parsing() {
        assert_eq!(
            parse_appointment_time("10:00").unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
        assert!(parse_appointment_time("10:65").is_err());
        assert!(parse_appointment_time("ten").is_err());
    }
}
