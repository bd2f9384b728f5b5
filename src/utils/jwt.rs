use std::collections::HashMap;

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::accounts::model::{ClaimSet, Role};
use crate::utils::errors::AppError;

/// Sessions last exactly one hour from issuance. Fixed; callers cannot
/// request a different lifetime.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Single rejection message for every verification failure. An expired
/// token is indistinguishable from a forged one on the wire.
const INVALID_TOKEN: &str = "Invalid or expired token";

/// Claims as they appear in the token payload.
///
/// The linked record id travels under a role-specific name
/// (`administrativo_matricula`, `professor_matricula`, `aluno_matricula`),
/// kept in the flattened map so one struct serves all four roles.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    email: String,
    role: String,
    iss: String,
    aud: String,
    iat: i64,
    exp: i64,
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

/// Signs a bearer token for the given claim set.
pub fn issue_token(claims: &ClaimSet, jwt_config: &JwtConfig) -> Result<String, AppError> {
    let now = Utc::now().timestamp();

    let mut extra = HashMap::new();
    if let Some(claim) = claims.role.linked_claim() {
        let linked = claims.linked_record_id.ok_or_else(|| {
            AppError::internal(anyhow::anyhow!(
                "{} claim set is missing its linked record id",
                claims.role
            ))
        })?;
        extra.insert(claim.to_string(), Value::String(linked.to_string()));
    }

    let wire = WireClaims {
        sub: claims.subject_id.to_string(),
        email: claims.email.clone(),
        role: claims.role.as_str().to_string(),
        iss: jwt_config.issuer.clone(),
        aud: jwt_config.audience.clone(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
        extra,
    };

    encode(
        &Header::default(),
        &wire,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("failed to sign token: {e}")))
}

/// Verifies signature, issuer, audience, and expiry, then decodes the
/// payload into a typed claim set.
///
/// Every failure collapses into the same unauthorized error.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<ClaimSet, AppError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&jwt_config.issuer]);
    validation.set_audience(&[&jwt_config.audience]);

    let data = decode::<WireClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::unauthorized(INVALID_TOKEN))?;

    claim_set_from_wire(data.claims).ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))
}

fn claim_set_from_wire(wire: WireClaims) -> Option<ClaimSet> {
    let subject_id = Uuid::parse_str(&wire.sub).ok()?;
    let role: Role = wire.role.parse().ok()?;

    // A non-admin token without its matricula claim is malformed.
    let linked_record_id = match role.linked_claim() {
        Some(claim) => Some(Uuid::parse_str(wire.extra.get(claim)?.as_str()?).ok()?),
        None => None,
    };

    Some(ClaimSet {
        subject_id,
        email: wire.email,
        role,
        linked_record_id,
    })
}
