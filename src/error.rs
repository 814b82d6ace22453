use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorObject,
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(&'static str, String),
    Forbidden(&'static str, String),
    BadRequest(&'static str, String),
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    Internal(String),
}

impl ApiError {
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("INVALID_CREDENTIALS", "Username or password is incorrect".into())
    }

    pub fn session_expired() -> Self {
        ApiError::Unauthorized("SESSION_EXPIRED", "Session expired".into())
    }

    pub fn duplicate_username() -> Self {
        ApiError::Conflict("DUPLICATE_USERNAME", "This username is already taken".into())
    }

    fn to_error_response(code: &str, message: &str) -> Json<ErrorResponse> {
        Json(ErrorResponse {
            error: ErrorObject {
                code: code.to_string(),
                message: message.to_string(),
            },
        })
    }
}

/// Collapse a sqlx failure into the API taxonomy: unique-index collisions on
/// username become DUPLICATE_USERNAME, everything else is an internal error.
pub fn map_user_insert_err(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return ApiError::duplicate_username();
        }
    }
    ApiError::Internal(format!("db error: {e}"))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(code, msg) => {
                (StatusCode::UNAUTHORIZED, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Forbidden(code, msg) => {
                (StatusCode::FORBIDDEN, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::BadRequest(code, msg) => {
                (StatusCode::BAD_REQUEST, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::NotFound(code, msg) => {
                (StatusCode::NOT_FOUND, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Conflict(code, msg) => {
                (StatusCode::CONFLICT, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::to_error_response("INTERNAL", &msg),
            )
                .into_response(),
        }
    }
}
