//! HTTP handlers for the account collections.
//!
//! One set of handlers serves all four collections; the collection's role
//! arrives through a router [`Extension`] and selects the identity
//! service. Ownership checks run here, after the router-level role
//! whitelist.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use super::model::{
    ChangePasswordRequest, CredentialView, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, Role,
};
use crate::metrics::{track_login_failure, track_login_success, track_registration};
use crate::middleware::auth::AuthUser;
use crate::middleware::role::{OwnershipClaim, authorize_email_access, authorize_resource, privileged_roles};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/{collection}/login",
    params(
        ("collection" = String, Path, description = "Account collection: admins, staff, teachers or students")
    ),
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Email and/or password incorrect", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Accounts"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let result = state.identity(role).login(&dto.email, &dto.password).await;

    match &result {
        Ok(_) => track_login_success(role.as_str()),
        Err(_) => track_login_failure(role.as_str()),
    }

    Ok(Json(result?))
}

/// Register a new credential
#[utoipa::path(
    post,
    path = "/api/{collection}/register",
    params(
        ("collection" = String, Path, description = "Account collection: admins, staff, teachers or students")
    ),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Credential created", body = CredentialView),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Accounts"
)]
#[instrument(skip(state, dto))]
pub async fn register(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<CredentialView>), AppError> {
    let view = state.identity(role).register(dto).await?;
    track_registration(role.as_str());

    Ok((StatusCode::CREATED, Json(view)))
}

/// Get the caller's own credential
#[utoipa::path(
    get,
    path = "/api/{collection}/me",
    params(
        ("collection" = String, Path, description = "Account collection: admins, staff, teachers or students")
    ),
    responses(
        (status = 200, description = "The caller's credential", body = CredentialView),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No credential in this collection for the caller", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    auth_user: AuthUser,
) -> Result<Json<CredentialView>, AppError> {
    let view = state.identity(role).get_by_id(auth_user.subject_id()).await?;
    Ok(Json(view))
}

/// Get a credential by id
#[utoipa::path(
    get,
    path = "/api/{collection}/{id}",
    params(
        ("collection" = String, Path, description = "Account collection: admins, staff, teachers or students"),
        ("id" = Uuid, Path, description = "Credential id")
    ),
    responses(
        (status = 200, description = "The credential", body = CredentialView),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller may not access this credential", body = ErrorResponse),
        (status = 404, description = "Credential not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
#[instrument(skip(state))]
pub async fn get_credential(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CredentialView>, AppError> {
    authorize_resource(
        auth_user.claims(),
        id,
        OwnershipClaim::Subject,
        privileged_roles(role),
    )?;

    let view = state.identity(role).get_by_id(id).await?;
    Ok(Json(view))
}

/// Get a credential by email
#[utoipa::path(
    get,
    path = "/api/{collection}/email/{email}",
    params(
        ("collection" = String, Path, description = "Account collection: admins, staff, teachers or students"),
        ("email" = String, Path, description = "Credential email")
    ),
    responses(
        (status = 200, description = "The credential", body = CredentialView),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller may not access this credential", body = ErrorResponse),
        (status = 404, description = "Credential not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
#[instrument(skip(state))]
pub async fn get_credential_by_email(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    auth_user: AuthUser,
    Path(email): Path<String>,
) -> Result<Json<CredentialView>, AppError> {
    authorize_email_access(auth_user.claims(), &email, privileged_roles(role))?;

    let view = state.identity(role).get_by_email(&email).await?;
    Ok(Json(view))
}

/// Change the caller's password
#[utoipa::path(
    post,
    path = "/api/{collection}/change-password",
    params(
        ("collection" = String, Path, description = "Account collection: admins, staff, teachers or students")
    ),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 401, description = "Incorrect current password", body = ErrorResponse),
        (status = 404, description = "Credential no longer exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
#[instrument(skip(state, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .identity(role)
        .change_password(
            auth_user.subject_id(),
            &dto.current_password,
            &dto.new_password,
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully.".to_string(),
    }))
}

/// List all admin credentials
#[utoipa::path(
    get,
    path = "/api/admins",
    responses(
        (status = 200, description = "All admin credentials", body = [CredentialView]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
#[instrument(skip(state))]
pub async fn list_credentials(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
) -> Result<Json<Vec<CredentialView>>, AppError> {
    let views = state.identity(role).list_all().await?;
    Ok(Json(views))
}

/// Delete an admin credential by email
#[utoipa::path(
    delete,
    path = "/api/admins/email/{email}",
    params(
        ("email" = String, Path, description = "Credential email")
    ),
    responses(
        (status = 200, description = "Credential deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Credential not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
#[instrument(skip(state))]
pub async fn delete_credential_by_email(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    Path(email): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.identity(role).delete_by_email(&email).await?;

    Ok(Json(MessageResponse {
        message: format!("Credential for {email} deleted."),
    }))
}
