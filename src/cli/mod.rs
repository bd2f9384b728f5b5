//! CLI support for administrative bootstrap.
//!
//! Admin credentials are never created through the public API; the first
//! one is inserted here, directly through the admin credential store.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::modules::accounts::model::Credential;
use crate::modules::accounts::store::{CredentialStore, PgCredentialStore};
use crate::utils::errors::AppError;
use crate::utils::password::derive_password;

/// Creates a bootstrap admin credential.
///
/// A duplicate email surfaces as the same conflict the API would report.
pub async fn create_admin(db: &PgPool, email: &str, password: &str) -> Result<(), AppError> {
    let (password_hash, salt) = derive_password(password);

    let now = Utc::now();
    let credential = Credential {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash,
        salt,
        linked_record_id: None,
        created_at: now,
        updated_at: now,
    };

    PgCredentialStore::admins(db.clone())
        .insert(&credential)
        .await
}
