//! JWT encoding and decoding.

use std::fmt;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::TokenError;
use crate::models::auth::{TokenClaims, TokenKind};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// HS256 signer/verifier built once from the process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Sign a claim set.
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(format!("jwt encode: {e}")))
    }

    /// Verify signature and expiry, then check the token kind and subject.
    ///
    /// Signature is checked before expiry, so a forged token that is also
    /// expired reports `InvalidSignature`.
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(classify)?
            .claims;

        if claims.typ != expected {
            return Err(TokenError::Malformed(format!(
                "expected {expected} token, got {}",
                claims.typ
            )));
        }
        claims
            .user_id()
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        Ok(claims)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed(err.to_string()),
    }
}
