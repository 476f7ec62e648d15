//! Account operations of the issuing service.

use tracing::{debug, info};

use cvgen_core::auth::password::{hash_password, validate_credentials, verify_password};
use cvgen_core::auth::{AuthError, TokenIssuer, TokenPair, TokenVerifier};
use cvgen_core::models::auth::Identity;
use cvgen_core::models::user::{Credentials, User};
use cvgen_core::users::{ADMIN_ROLE, RoleProvider, USER_ROLE, UserRepository};

/// Create an account and sign it in. The first account becomes admin.
pub async fn register(
    users: &dyn UserRepository,
    issuer: &TokenIssuer,
    credentials: &Credentials,
) -> Result<(User, TokenPair), AuthError> {
    validate_credentials(&credentials.login, &credentials.password)?;

    let password_hash = hash_password(&credentials.password)?;
    let role = if users.user_count().await? == 0 {
        ADMIN_ROLE
    } else {
        USER_ROLE
    };

    let user = users
        .create_user(&credentials.login, &password_hash, vec![role.to_string()])
        .await?;
    info!(user_id = %user.id, role, "user registered");

    let pair = issuer.issue_pair(&user.identity())?;
    Ok((user, pair))
}

/// Check a login/password and issue a fresh pair.
pub async fn login(
    users: &dyn UserRepository,
    issuer: &TokenIssuer,
    credentials: &Credentials,
) -> Result<(User, TokenPair), AuthError> {
    let Some(user) = users.find_by_login(&credentials.login).await? else {
        debug!("login for unknown user");
        return Err(AuthError::CredentialError);
    };
    if !verify_password(&credentials.password, &user.password_hash)? {
        debug!(user_id = %user.id, "login with wrong password");
        return Err(AuthError::CredentialError);
    }

    let pair = issuer.issue_pair(&user.identity())?;
    Ok((user, pair))
}

/// Exchange a refresh token for a new pair, picking up current roles.
pub async fn refresh(
    verifier: &TokenVerifier,
    issuer: &TokenIssuer,
    roles: &dyn RoleProvider,
    refresh_token: &str,
) -> Result<TokenPair, AuthError> {
    let id = verifier.verify_refresh(refresh_token)?;
    let identity = Identity::new(id).with_roles(roles.roles_for(id).await);
    Ok(issuer.issue_pair(&identity)?)
}
