use std::env;

/// Token signing configuration.
///
/// Injected explicitly into issue/verify calls so tests can pin a fixed
/// secret instead of reading ambient state.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    /// Reads signing configuration from the environment.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is unset. There is no fallback secret; a
    /// process without one must not come up.
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "secretaria-api".to_string()),
            audience: env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "secretaria-clients".to_string()),
        }
    }
}
