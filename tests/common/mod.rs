use axum::Router;
use jsonwebtoken::{EncodingKey, Header, encode};
use secretaria::modules::accounts::model::{CredentialView, RegisterRequest, Role};
use secretaria::router::init_router;
use secretaria::state::{AppState, test_app_state};
use serde_json::json;
use uuid::Uuid;

/// The full router over in-memory stores, plus the state used to seed it.
pub fn setup_test_app() -> (Router, AppState) {
    let state = test_app_state();
    let app = init_router(state.clone());
    (app, state)
}

/// Seeds a credential directly through the collection's identity service.
///
/// Non-admin roles get a fresh linked record id; read it back from the
/// returned view when a test needs it.
#[allow(dead_code)]
pub async fn seed_credential(
    state: &AppState,
    role: Role,
    email: &str,
    password: &str,
) -> CredentialView {
    let linked_record_id = role.requires_linked_record().then(Uuid::new_v4);

    state
        .identity(role)
        .register(RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            linked_record_id,
        })
        .await
        .unwrap()
}

/// Logs a seeded credential in and returns its bearer token.
#[allow(dead_code)]
pub async fn login_token(state: &AppState, role: Role, email: &str, password: &str) -> String {
    state
        .identity(role)
        .login(email, password)
        .await
        .unwrap()
        .access_token
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

/// Signs a token with the state's secret but an arbitrary issuance
/// instant, so tests can produce already-expired sessions.
#[allow(dead_code)]
pub fn token_issued_at(state: &AppState, role: Role, issued_at: i64) -> String {
    let mut claims = json!({
        "sub": Uuid::new_v4().to_string(),
        "email": generate_unique_email(),
        "role": role.as_str(),
        "iss": state.jwt_config.issuer,
        "aud": state.jwt_config.audience,
        "iat": issued_at,
        "exp": issued_at + secretaria::utils::jwt::TOKEN_TTL_SECS,
    });
    if let Some(claim) = role.linked_claim() {
        claims[claim] = json!(Uuid::new_v4().to_string());
    }

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_config.secret.as_bytes()),
    )
    .unwrap()
}
