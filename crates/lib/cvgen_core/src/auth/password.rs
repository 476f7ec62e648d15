//! Password hashing via bcrypt.

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Minimum length for both login and password.
pub const MIN_CREDENTIAL_LEN: usize = 6;

/// Hash a password with bcrypt (cost 10).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Reject logins or passwords shorter than [`MIN_CREDENTIAL_LEN`] characters.
pub fn validate_credentials(login: &str, password: &str) -> Result<(), AuthError> {
    if login.chars().count() < MIN_CREDENTIAL_LEN || password.chars().count() < MIN_CREDENTIAL_LEN
    {
        return Err(AuthError::ValidationError(format!(
            "Login and password must be at least {MIN_CREDENTIAL_LEN} characters long"
        )));
    }
    Ok(())
}
