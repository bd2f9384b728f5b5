//! Routers for the four account collections.
//!
//! Each collection pairs a public surface (login, and for the non-admin
//! collections registration) with a protected surface behind that
//! collection's role guard. The collection's [`Role`] rides a router
//! [`Extension`] so one set of handlers serves all four.

use axum::{
    Extension, Router, middleware,
    routing::{delete, get, post},
};

use super::controller::{
    change_password, delete_credential_by_email, get_credential, get_credential_by_email,
    list_credentials, login, me, register,
};
use super::model::Role;
use crate::middleware::role::{require_admin, require_staff, require_student, require_teacher};
use crate::state::AppState;

/// Protected routes every collection shares.
fn self_service_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/change-password", post(change_password))
        .route("/email/{email}", get(get_credential_by_email))
        .route("/{id}", get(get_credential))
}

/// Admin collection. Registration sits behind the guard: only an existing
/// admin can create another one, and the first comes from the CLI.
pub fn init_admins_router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/login", post(login));

    let protected = self_service_routes()
        .route("/", get(list_credentials))
        .route("/register", post(register))
        .route("/email/{email}", delete(delete_credential_by_email))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    public.merge(protected).layer(Extension(Role::Admin))
}

pub fn init_staff_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(login))
        .route("/register", post(register));

    let protected =
        self_service_routes().route_layer(middleware::from_fn_with_state(state, require_staff));

    public.merge(protected).layer(Extension(Role::Staff))
}

pub fn init_teachers_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(login))
        .route("/register", post(register));

    let protected =
        self_service_routes().route_layer(middleware::from_fn_with_state(state, require_teacher));

    public.merge(protected).layer(Extension(Role::Teacher))
}

pub fn init_students_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(login))
        .route("/register", post(register));

    let protected =
        self_service_routes().route_layer(middleware::from_fn_with_state(state, require_student));

    public.merge(protected).layer(Extension(Role::Student))
}
