//! Identity operations for one account collection.
//!
//! A single [`IdentityService`] implementation serves all four roles;
//! each instance is bound to its role tag and its own credential store.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::task;
use tracing::instrument;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::accounts::model::{
    ClaimSet, Credential, CredentialView, LoginResponse, RegisterRequest, Role,
};
use crate::modules::accounts::store::CredentialStore;
use crate::utils::errors::AppError;
use crate::utils::jwt::issue_token;
use crate::utils::password::{derive_password, verify_password};

/// One message for both failure paths so a caller cannot probe which
/// field was wrong.
const LOGIN_FAILED: &str = "email and/or password incorrect";

#[derive(Clone)]
pub struct IdentityService {
    role: Role,
    store: Arc<dyn CredentialStore>,
    jwt_config: JwtConfig,
}

impl IdentityService {
    pub fn new(role: Role, store: Arc<dyn CredentialStore>, jwt_config: JwtConfig) -> Self {
        Self {
            role,
            store,
            jwt_config,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Authenticates by email and password and mints a session token.
    ///
    /// Unknown email and failed verification produce the same error; the
    /// lookup always completes before verification is attempted.
    #[instrument(skip(self, password), fields(role = %self.role))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let credential = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::unauthorized(LOGIN_FAILED))?;

        if !self.verify_blocking(password, &credential).await? {
            return Err(AppError::unauthorized(LOGIN_FAILED));
        }

        let claims = ClaimSet {
            subject_id: credential.id,
            email: credential.email.clone(),
            role: self.role,
            linked_record_id: credential.linked_record_id,
        };
        let token = issue_token(&claims, &self.jwt_config)?;

        Ok(LoginResponse::new(token, credential.view(self.role)))
    }

    /// Creates a credential for this collection.
    ///
    /// Non-admin roles must supply the domain record their credential is
    /// bound to; admins have no linked record and any supplied id is
    /// dropped.
    #[instrument(skip(self, dto), fields(role = %self.role))]
    pub async fn register(&self, dto: RegisterRequest) -> Result<CredentialView, AppError> {
        let linked_record_id = if self.role.requires_linked_record() {
            match dto.linked_record_id {
                Some(id) => Some(id),
                None => {
                    return Err(AppError::validation(format!(
                        "linked_record_id is required for {} registration",
                        self.role
                    )));
                }
            }
        } else {
            None
        };

        if self.store.find_by_email(&dto.email).await?.is_some() {
            return Err(AppError::conflict(format!(
                "email {} is already registered",
                dto.email
            )));
        }

        let (password_hash, salt) = self.derive_blocking(&dto.password).await?;

        let now = Utc::now();
        let credential = Credential {
            id: Uuid::new_v4(),
            email: dto.email,
            password_hash,
            salt,
            linked_record_id,
            created_at: now,
            updated_at: now,
        };

        // Two racers can both pass the pre-check; the store's unique
        // constraint settles it and the loser sees the same conflict.
        self.store.insert(&credential).await?;

        Ok(credential.view(self.role))
    }

    /// Rotates the caller's password after verifying the current one.
    ///
    /// The new hash and a fresh salt are persisted in a single store
    /// update; the old salt is discarded.
    #[instrument(skip(self, current_password, new_password), fields(role = %self.role))]
    pub async fn change_password(
        &self,
        subject_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let mut credential = self
            .store
            .find_by_id(subject_id)
            .await?
            .ok_or_else(|| AppError::not_found("credential not found"))?;

        if !self.verify_blocking(current_password, &credential).await? {
            return Err(AppError::unauthorized("incorrect password"));
        }

        let (password_hash, salt) = self.derive_blocking(new_password).await?;
        credential.password_hash = password_hash;
        credential.salt = salt;
        credential.updated_at = Utc::now();

        self.store.update(&credential).await
    }

    #[instrument(skip(self), fields(role = %self.role))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<CredentialView, AppError> {
        let credential = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("credential not found"))?;

        Ok(credential.view(self.role))
    }

    #[instrument(skip(self), fields(role = %self.role))]
    pub async fn get_by_email(&self, email: &str) -> Result<CredentialView, AppError> {
        let credential = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found("credential not found"))?;

        Ok(credential.view(self.role))
    }

    #[instrument(skip(self), fields(role = %self.role))]
    pub async fn list_all(&self) -> Result<Vec<CredentialView>, AppError> {
        let credentials = self.store.list_all().await?;
        Ok(credentials.iter().map(|c| c.view(self.role)).collect())
    }

    #[instrument(skip(self), fields(role = %self.role))]
    pub async fn delete_by_email(&self, email: &str) -> Result<(), AppError> {
        let credential = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found("credential not found"))?;

        self.store.delete(&credential).await
    }

    // Key derivation costs tens of milliseconds per call; it runs on the
    // blocking pool so runtime workers stay free.
    async fn verify_blocking(
        &self,
        password: &str,
        credential: &Credential,
    ) -> Result<bool, AppError> {
        let password = password.to_string();
        let hash = credential.password_hash.clone();
        let salt = credential.salt.clone();

        task::spawn_blocking(move || verify_password(&password, &hash, &salt))
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!("key derivation task failed: {e}")))?
    }

    async fn derive_blocking(&self, password: &str) -> Result<(String, String), AppError> {
        let password = password.to_string();

        task::spawn_blocking(move || derive_password(&password))
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!("key derivation task failed: {e}")))
    }
}

impl fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityService")
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
