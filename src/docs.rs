use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::accounts::controller::ErrorResponse;
use crate::modules::accounts::model::{
    ChangePasswordRequest, CredentialView, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, Role,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::accounts::controller::login,
        crate::modules::accounts::controller::register,
        crate::modules::accounts::controller::me,
        crate::modules::accounts::controller::get_credential,
        crate::modules::accounts::controller::get_credential_by_email,
        crate::modules::accounts::controller::change_password,
        crate::modules::accounts::controller::list_credentials,
        crate::modules::accounts::controller::delete_credential_by_email,
    ),
    components(
        schemas(
            Role,
            CredentialView,
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            ChangePasswordRequest,
            MessageResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Accounts", description = "Login, registration, and credential management for the four account collections"),
        (name = "Admins", description = "Admin-only credential administration")
    ),
    info(
        title = "Secretaria API",
        version = "0.1.0",
        description = "Identity and access control for a school administration backend: per-role credential stores, PBKDF2 password hashing, and one-hour bearer tokens.",
        contact(
            name = "API Support",
            email = "suporte@secretaria-escolar.com"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
