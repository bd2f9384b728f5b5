//! Role-based authorization for the account collections.
//!
//! Two layers of checks run after token verification:
//!
//! 1. A role whitelist per collection, applied as router middleware via
//!    [`require_roles`] and its wrappers.
//! 2. The self-or-privileged ownership check, applied inside handlers via
//!    [`authorize_resource`] / [`authorize_email_access`].

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::accounts::model::{ClaimSet, Role};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Middleware that admits only the listed roles.
///
/// Runs the bearer verification itself, so routers can guard a whole
/// protected subtree with one layer.
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: Vec<Role>,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    if !allowed_roles.contains(&auth_user.role()) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {:?}, but caller has role: {}",
            allowed_roles
                .iter()
                .map(Role::as_str)
                .collect::<Vec<_>>(),
            auth_user.role()
        )));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Admin collection guard: admins only.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, vec![Role::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Staff collection guard: staff themselves plus admins.
pub async fn require_staff(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, vec![Role::Staff, Role::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Teacher collection guard: teachers, staff, and admins.
pub async fn require_teacher(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        vec![Role::Teacher, Role::Staff, Role::Admin],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Student collection guard: students, staff, and admins.
pub async fn require_student(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        vec![Role::Student, Role::Staff, Role::Admin],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Which claim marks the caller as owner of the requested resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipClaim {
    /// The credential id itself (`subject_id` claim). Used where the
    /// resource is addressed by credential id.
    Subject,
    /// The bound domain record (the `*_matricula` claim). Used where the
    /// resource is addressed by domain record id.
    LinkedRecord,
}

/// Roles allowed past the ownership check on a collection.
///
/// Admins bypass it everywhere; staff additionally bypass it on teacher
/// and student resources. Within their own collection, staff see only
/// themselves.
pub fn privileged_roles(collection: Role) -> &'static [Role] {
    match collection {
        Role::Admin | Role::Staff => &[Role::Admin],
        Role::Teacher | Role::Student => &[Role::Admin, Role::Staff],
    }
}

const NOT_YOUR_RECORD: &str = "Access denied. You may only access your own record.";

/// The self-or-privileged policy, evaluated after role whitelisting.
///
/// Privileged callers may address any resource id; everyone else must be
/// addressing the record their claims own.
pub fn authorize_resource(
    claims: &ClaimSet,
    requested: Uuid,
    ownership: OwnershipClaim,
    privileged: &[Role],
) -> Result<(), AppError> {
    if privileged.contains(&claims.role) {
        return Ok(());
    }

    let own_id = match ownership {
        OwnershipClaim::Subject => Some(claims.subject_id),
        OwnershipClaim::LinkedRecord => claims.linked_record_id,
    };

    if own_id == Some(requested) {
        return Ok(());
    }

    Err(AppError::forbidden(NOT_YOUR_RECORD))
}

/// Email-addressed variant of [`authorize_resource`].
pub fn authorize_email_access(
    claims: &ClaimSet,
    email: &str,
    privileged: &[Role],
) -> Result<(), AppError> {
    if privileged.contains(&claims.role) || claims.email == email {
        return Ok(());
    }

    Err(AppError::forbidden(NOT_YOUR_RECORD))
}
