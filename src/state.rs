use std::sync::Arc;

use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::jwt::JwtConfig;
use crate::modules::accounts::model::Role;
use crate::modules::accounts::service::IdentityService;
use crate::modules::accounts::store::{CredentialStore, PgCredentialStore};

/// Shared application state: configuration plus one identity service per
/// account collection.
#[derive(Clone, Debug)]
pub struct AppState {
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub admins: IdentityService,
    pub staff: IdentityService,
    pub teachers: IdentityService,
    pub students: IdentityService,
}

impl AppState {
    /// Builds the state from one store per role. The stores stay
    /// independent; no service can reach another role's credentials.
    pub fn with_stores(
        admins: Arc<dyn CredentialStore>,
        staff: Arc<dyn CredentialStore>,
        teachers: Arc<dyn CredentialStore>,
        students: Arc<dyn CredentialStore>,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            admins: IdentityService::new(Role::Admin, admins, jwt_config.clone()),
            staff: IdentityService::new(Role::Staff, staff, jwt_config.clone()),
            teachers: IdentityService::new(Role::Teacher, teachers, jwt_config.clone()),
            students: IdentityService::new(Role::Student, students, jwt_config.clone()),
            jwt_config,
            cors_config,
        }
    }

    /// The identity service backing one collection.
    pub fn identity(&self, role: Role) -> &IdentityService {
        match role {
            Role::Admin => &self.admins,
            Role::Staff => &self.staff,
            Role::Teacher => &self.teachers,
            Role::Student => &self.students,
        }
    }
}

pub async fn init_app_state() -> AppState {
    let pool = init_db_pool().await;

    AppState::with_stores(
        Arc::new(PgCredentialStore::admins(pool.clone())),
        Arc::new(PgCredentialStore::staff(pool.clone())),
        Arc::new(PgCredentialStore::teachers(pool.clone())),
        Arc::new(PgCredentialStore::students(pool)),
        JwtConfig::from_env(),
        CorsConfig::from_env(),
    )
}

/// State over in-memory stores and a fixed signing secret, so suites run
/// without a database or environment.
#[cfg(any(test, feature = "test-utils"))]
pub fn test_app_state() -> AppState {
    use crate::modules::accounts::store::InMemoryCredentialStore;

    let jwt_config = JwtConfig {
        secret: "test-signing-secret".to_string(),
        issuer: "secretaria-api".to_string(),
        audience: "secretaria-clients".to_string(),
    };
    let cors_config = CorsConfig {
        allowed_origins: vec!["http://localhost:3000".to_string()],
    };

    AppState::with_stores(
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(InMemoryCredentialStore::new()),
        jwt_config,
        cors_config,
    )
}
