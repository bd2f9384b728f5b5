use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::modules::accounts::model::{ClaimSet, Role};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Extractor that verifies the bearer token and exposes the caller's
/// typed claim set.
///
/// Rejecting here means no claims ever reach a handler: a request is
/// either fully authenticated or carries nothing.
#[derive(Debug, Clone)]
pub struct AuthUser(pub ClaimSet);

impl AuthUser {
    pub fn claims(&self) -> &ClaimSet {
        &self.0
    }

    pub fn subject_id(&self) -> Uuid {
        self.0.subject_id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Domain record bound to the caller's credential, `None` for admins.
    pub fn linked_record_id(&self) -> Option<Uuid> {
        self.0.linked_record_id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}
