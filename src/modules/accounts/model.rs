//! Credential data models and DTOs.
//!
//! This module contains the data structures shared by the four account
//! collections:
//!
//! - [`Role`] - the four account classes and their wire tags
//! - [`Credential`] - a credential row as stored (hash and salt included)
//! - [`CredentialView`] - the sanitized projection returned by the API
//! - [`ClaimSet`] - the typed contents of a bearer token
//!
//! # Request DTOs
//!
//! - [`LoginRequest`] - authenticate with email and password
//! - [`RegisterRequest`] - create a credential
//! - [`ChangePasswordRequest`] - rotate the caller's password

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// The four account classes.
///
/// Each class authenticates against its own credential table and carries
/// its own wire tag in the token's `role` claim. Non-admin classes are
/// bound 1:1 to a domain record (a staff, teacher, or student matricula);
/// that id travels under a role-specific claim name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "administrativo")]
    Staff,
    #[serde(rename = "professor")]
    Teacher,
    #[serde(rename = "aluno")]
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "administrativo",
            Role::Teacher => "professor",
            Role::Student => "aluno",
        }
    }

    /// Claim name carrying the linked record id, `None` for admins.
    pub fn linked_claim(&self) -> Option<&'static str> {
        match self {
            Role::Admin => None,
            Role::Staff => Some("administrativo_matricula"),
            Role::Teacher => Some("professor_matricula"),
            Role::Student => Some("aluno_matricula"),
        }
    }

    pub fn requires_linked_record(&self) -> bool {
        self.linked_claim().is_some()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "administrativo" => Ok(Role::Staff),
            "professor" => Ok(Role::Teacher),
            "aluno" => Ok(Role::Student),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A credential row as persisted.
///
/// `password_hash` and `salt` are always written together and never leave
/// the service layer; responses are built from [`CredentialView`].
#[derive(Clone, FromRow)]
pub struct Credential {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub linked_record_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn view(&self, role: Role) -> CredentialView {
        CredentialView {
            id: self.id,
            email: self.email.clone(),
            role,
            linked_record_id: self.linked_record_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// Hash and salt stay out of debug output and therefore out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("salt", &"<redacted>")
            .field("linked_record_id", &self.linked_record_id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Sanitized credential projection.
///
/// The only credential shape that crosses the API boundary. It has no
/// hash or salt fields at all, so a serialization bug cannot leak them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CredentialView {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_record_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Decoded bearer token contents, typed.
///
/// Built at login and reconstructed by the auth extractor on every
/// protected request. Conversion to and from the wire claim map lives in
/// [`crate::utils::jwt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    pub subject_id: Uuid,
    pub email: String,
    pub role: Role,
    pub linked_record_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    /// Domain record this credential belongs to. Required for staff,
    /// teacher, and student registration; ignored for admins.
    pub linked_record_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub credential: CredentialView,
}

impl LoginResponse {
    pub fn new(access_token: String, credential: CredentialView) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            credential,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
