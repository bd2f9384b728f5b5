//! Credential persistence.
//!
//! [`CredentialStore`] is the storage capability the identity service
//! works against. [`PgCredentialStore`] backs it with one PostgreSQL
//! table per role; [`InMemoryCredentialStore`] (behind `test-utils`)
//! backs the test suites without a database.

#[cfg(any(test, feature = "test-utils"))]
use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
#[cfg(any(test, feature = "test-utils"))]
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::modules::accounts::model::Credential;
use crate::utils::errors::AppError;

/// Storage boundary for one role's credential set.
///
/// Implementations own commit semantics. Callers follow a strict
/// read-then-decide-then-write sequence and rely on the store's unique
/// constraints to settle concurrent writers.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, AppError>;
    async fn insert(&self, credential: &Credential) -> Result<(), AppError>;
    async fn update(&self, credential: &Credential) -> Result<(), AppError>;
    async fn delete(&self, credential: &Credential) -> Result<(), AppError>;
    async fn list_all(&self) -> Result<Vec<Credential>, AppError>;
}

const CREDENTIAL_COLUMNS: &str =
    "id, email, password_hash, salt, linked_record_id, created_at, updated_at";

/// PostgreSQL-backed store. One instance per role, each bound to its own
/// table, so the four credential sets stay fully isolated.
pub struct PgCredentialStore {
    pool: PgPool,
    table: &'static str,
}

impl PgCredentialStore {
    pub fn admins(pool: PgPool) -> Self {
        Self {
            pool,
            table: "admin_credentials",
        }
    }

    pub fn staff(pool: PgPool) -> Self {
        Self {
            pool,
            table: "staff_credentials",
        }
    }

    pub fn teachers(pool: PgPool) -> Self {
        Self {
            pool,
            table: "teacher_credentials",
        }
    }

    pub fn students(pool: PgPool) -> Self {
        Self {
            pool,
            table: "student_credentials",
        }
    }
}

/// Maps a unique-constraint violation to the conflict the caller raced
/// against; anything else stays internal. Keeps a register race loser
/// indistinguishable from a failed pre-check.
fn map_write_error(err: sqlx::Error, email: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(c) if c.ends_with("_linked_record_id_key") => {
                    AppError::conflict("a credential already exists for this record")
                }
                _ => AppError::conflict(format!("email {email} is already registered")),
            };
        }
    }
    AppError::internal(anyhow::Error::from(err))
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AppError> {
        let sql = format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM {} WHERE email = $1",
            self.table
        );

        let credential = sqlx::query_as::<_, Credential>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(credential)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, AppError> {
        let sql = format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM {} WHERE id = $1",
            self.table
        );

        let credential = sqlx::query_as::<_, Credential>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(credential)
    }

    async fn insert(&self, credential: &Credential) -> Result<(), AppError> {
        let sql = format!(
            "INSERT INTO {} ({CREDENTIAL_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            self.table
        );

        sqlx::query(&sql)
            .bind(credential.id)
            .bind(&credential.email)
            .bind(&credential.password_hash)
            .bind(&credential.salt)
            .bind(credential.linked_record_id)
            .bind(credential.created_at)
            .bind(credential.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &credential.email))?;

        Ok(())
    }

    async fn update(&self, credential: &Credential) -> Result<(), AppError> {
        // Hash and salt land in one statement; a credential is never
        // visible with a new hash and an old salt.
        let sql = format!(
            "UPDATE {} SET email = $2, password_hash = $3, salt = $4, updated_at = $5 WHERE id = $1",
            self.table
        );

        let result = sqlx::query(&sql)
            .bind(credential.id)
            .bind(&credential.email)
            .bind(&credential.password_hash)
            .bind(&credential.salt)
            .bind(credential.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &credential.email))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("credential not found"));
        }

        Ok(())
    }

    async fn delete(&self, credential: &Credential) -> Result<(), AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);

        let result = sqlx::query(&sql)
            .bind(credential.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("credential not found"));
        }

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Credential>, AppError> {
        let sql = format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM {} ORDER BY created_at",
            self.table
        );

        let credentials = sqlx::query_as::<_, Credential>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(credentials)
    }
}

/// In-memory store mirroring the PostgreSQL semantics, including the
/// unique-constraint conflicts, so service and router tests run without
/// a database.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct InMemoryCredentialStore {
    records: RwLock<HashMap<Uuid, Credential>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AppError> {
        let records = self.records.read().await;
        Ok(records.values().find(|c| c.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, AppError> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn insert(&self, credential: &Credential) -> Result<(), AppError> {
        let mut records = self.records.write().await;

        if records.values().any(|c| c.email == credential.email) {
            return Err(AppError::conflict(format!(
                "email {} is already registered",
                credential.email
            )));
        }
        if credential.linked_record_id.is_some()
            && records
                .values()
                .any(|c| c.linked_record_id == credential.linked_record_id)
        {
            return Err(AppError::conflict(
                "a credential already exists for this record",
            ));
        }

        records.insert(credential.id, credential.clone());
        Ok(())
    }

    async fn update(&self, credential: &Credential) -> Result<(), AppError> {
        let mut records = self.records.write().await;

        match records.get_mut(&credential.id) {
            Some(existing) => {
                *existing = credential.clone();
                Ok(())
            }
            None => Err(AppError::not_found("credential not found")),
        }
    }

    async fn delete(&self, credential: &Credential) -> Result<(), AppError> {
        let mut records = self.records.write().await;

        match records.remove(&credential.id) {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("credential not found")),
        }
    }

    async fn list_all(&self) -> Result<Vec<Credential>, AppError> {
        let records = self.records.read().await;
        let mut all: Vec<Credential> = records.values().cloned().collect();
        all.sort_by_key(|c| c.created_at);
        Ok(all)
    }
}
