use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub session_ttl_hours: i64,
}

/* -------------------------
   Roles
--------------------------*/

// cabs_user.role (smallint): 0 patient, 1 admin, 2 doctor
pub const ROLE_PATIENT: i16 = 0;
pub const ROLE_ADMIN: i16 = 1;
pub const ROLE_DOCTOR: i16 = 2;

pub fn role_to_string(role: i16) -> String {
    match role {
        ROLE_PATIENT => "patient",
        ROLE_ADMIN => "admin",
        ROLE_DOCTOR => "doctor",
        _ => "unknown",
    }
    .to_string()
}

/* -------------------------
   API DTOs
--------------------------*/

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub device_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub data: LoginResponseData,
}

#[derive(Debug, Serialize)]
pub struct LoginResponseData {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub data: MeResponseData,
}

#[derive(Debug, Serialize)]
pub struct MeResponseData {
    pub user: UserProfile,
    pub session: SessionInfo,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub data: OkData,
}

#[derive(Debug, Serialize)]
pub struct OkData {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub session_token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/* -------------------------
   DB Row Models
--------------------------*/

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: i16,
    pub is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub struct SessionTokenRow {
    pub session_token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DoctorRow {
    pub doctor_id: Uuid,
    pub full_name: String,
    pub specialization: String,
}

/* -------------------------
   Appointments
--------------------------*/

// appointment.status (smallint): 0 booked, 1 cancelled
pub const APPOINTMENT_BOOKED: i16 = 0;
pub const APPOINTMENT_CANCELLED: i16 = 1;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AppointmentRow {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: i16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings_match_table() {
        assert_eq!(role_to_string(ROLE_PATIENT), "patient");
        assert_eq!(role_to_string(ROLE_ADMIN), "admin");
        assert_eq!(role_to_string(ROLE_DOCTOR), "doctor");
        assert_eq!(role_to_string(7), "unknown");
    }

    #[test]
    fn status_constants_are_distinct() {
        assert_eq!(APPOINTMENT_BOOKED, 0);
        assert_eq!(APPOINTMENT_CANCELLED, 1);
    }
}
