use data_encoding::BASE64;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::utils::errors::AppError;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Fixed KDF cost. Changing it invalidates every stored hash.
const ITERATIONS: u32 = 100_000;

/// Derives a password hash with a fresh random salt.
///
/// Returns `(hash, salt)`, both base64-encoded. Two calls with the same
/// password produce different salts and therefore different hashes.
pub fn derive_password(password: &str) -> (String, String) {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, ITERATIONS, &mut key);

    (BASE64.encode(&key), BASE64.encode(&salt))
}

/// Re-derives with the stored salt and compares against the stored hash in
/// constant time.
///
/// A stored hash or salt that fails to decode means corrupted persisted
/// data and surfaces as an internal error, not a failed verification.
pub fn verify_password(
    password: &str,
    stored_hash: &str,
    stored_salt: &str,
) -> Result<bool, AppError> {
    let salt = BASE64
        .decode(stored_salt.as_bytes())
        .map_err(|e| AppError::internal(anyhow::anyhow!("stored salt is not valid base64: {e}")))?;
    let expected = BASE64
        .decode(stored_hash.as_bytes())
        .map_err(|e| AppError::internal(anyhow::anyhow!("stored hash is not valid base64: {e}")))?;

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, ITERATIONS, &mut key);

    Ok(key.ct_eq(&expected).into())
}
