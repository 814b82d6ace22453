use axum::{Json, Router, extract::State, routing::get};

use crate::error::ApiError;
use crate::middleware::auth_context::AuthContext;
use crate::models::{AppState, ROLE_ADMIN, ROLE_DOCTOR, ROLE_PATIENT};

#[derive(serde::Serialize)]
pub struct HomeResponse {
    pub data: HomeData,
}

#[derive(serde::Serialize)]
pub struct HomeData {
    pub view: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/home", get(home))
}

/// Post-login routing table: which dashboard the caller lands on.
fn view_for_role(role: i16) -> &'static str {
    match role {
        ROLE_ADMIN => "admin",
        ROLE_DOCTOR => "doctor",
        ROLE_PATIENT => "patient",
        // unreachable while the role check constraint holds
        _ => "unknown",
    }
}

pub async fn home(
    State(_state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<HomeResponse>, ApiError> {
    Ok(Json(HomeResponse {
        data: HomeData {
            view: view_for_role(auth.role).to_string(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_table_covers_all_roles() {
        assert_eq!(view_for_role(ROLE_ADMIN), "admin");
        assert_eq!(view_for_role(ROLE_DOCTOR), "doctor");
        assert_eq!(view_for_role(ROLE_PATIENT), "patient");
        assert_eq!(view_for_role(42), "unknown");
    }
}
