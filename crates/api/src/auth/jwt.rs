//! HS256 access-token issuing and validation.
//!
//! Tokens carry the user's id, email and display name. Only HS256 is
//! accepted on validation; tokens signed with any other algorithm fail.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use quill_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::config::{env_or, ConfigError};

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's internal database id.
    pub user_id: DbId,
    pub email: String,
    pub name: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in hours (default: 24).
    pub expiry_hours: i64,
}

/// Default token lifetime in hours.
const DEFAULT_EXPIRY_HOURS: i64 = 24;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var            | Required | Default |
    /// |--------------------|----------|---------|
    /// | `JWT_SECRET`       | **yes**  | --      |
    /// | `JWT_EXPIRY_HOURS` | no       | `24`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }

        Ok(Self {
            secret,
            expiry_hours: env_or("JWT_EXPIRY_HOURS", DEFAULT_EXPIRY_HOURS)?,
        })
    }

    /// Token lifetime in seconds, as reported to clients.
    pub fn expires_in_secs(&self) -> i64 {
        self.expiry_hours * 3600
    }
}

/// Why a token could not be issued or validated.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT secret is not configured")]
    SecretNotConfigured,

    #[error("Token carries an invalid user id")]
    InvalidUserId,

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Issue an HS256 access token for the given user.
pub fn issue_token(
    user_id: DbId,
    email: &str,
    name: &str,
    config: &JwtConfig,
) -> Result<String, TokenError> {
    if config.secret.is_empty() {
        return Err(TokenError::SecretNotConfigured);
    }

    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        user_id,
        email: email.to_string(),
        name: name.to_string(),
        exp: now + config.expires_in_secs(),
        iat: now,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;
    Ok(token)
}

/// Validate a token and return its [`Claims`].
///
/// Checks the signature, that the algorithm is HS256, expiry, and that a
/// positive `user_id` claim is present.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    if config.secret.is_empty() {
        return Err(TokenError::SecretNotConfigured);
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    if token_data.claims.user_id <= 0 {
        return Err(TokenError::InvalidUserId);
    }
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    /// Helper to build a test config with a known secret.
    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_hours: 24,
        }
    }

    fn sign(claims: &Claims, header: Header, secret: &str) -> String {
        encode(&header, claims, &EncodingKey::from_secret(secret.as_bytes()))
            .expect("encoding should succeed")
    }

    #[test]
    fn test_issue_and_validate_token() {
        let config = test_config();
        let token = issue_token(42, "ada@example.com", "Ada", &config)
            .expect("token generation should succeed");

        let claims = validate_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.exp - claims.iat, 24 * 3600, "lifetime is 24 hours");
    }

    #[test]
    fn test_issue_fails_without_secret() {
        let config = JwtConfig {
            secret: String::new(),
            expiry_hours: 24,
        };
        assert_matches!(
            issue_token(1, "a@b.c", "A", &config),
            Err(TokenError::SecretNotConfigured)
        );
    }

    #[test]
    fn test_expired_token_fails() {
        let config = test_config();

        // Use a margin well beyond the default 60-second leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            user_id: 1,
            email: "a@b.c".to_string(),
            name: "A".to_string(),
            exp: now - 300,
            iat: now - 600,
        };
        let token = sign(&claims, Header::new(Algorithm::HS256), &config.secret);

        assert!(
            validate_token(&token, &config).is_err(),
            "expired token must fail validation"
        );
    }

    #[test]
    fn test_different_secrets_fail() {
        let config_a = JwtConfig {
            secret: "secret-alpha".to_string(),
            expiry_hours: 24,
        };
        let config_b = JwtConfig {
            secret: "secret-bravo".to_string(),
            expiry_hours: 24,
        };

        let token = issue_token(1, "a@b.c", "A", &config_a).expect("token generation should succeed");

        assert!(
            validate_token(&token, &config_b).is_err(),
            "token signed with a different secret must fail"
        );
    }

    #[test]
    fn test_other_hmac_algorithm_is_rejected() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            user_id: 1,
            email: "a@b.c".to_string(),
            name: "A".to_string(),
            exp: now + 3600,
            iat: now,
        };
        let token = sign(&claims, Header::new(Algorithm::HS512), &config.secret);

        assert!(validate_token(&token, &config).is_err(), "HS512 must be rejected");
    }

    #[test]
    fn test_non_positive_user_id_is_rejected() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            user_id: 0,
            email: "a@b.c".to_string(),
            name: "A".to_string(),
            exp: now + 3600,
            iat: now,
        };
        let token = sign(&claims, Header::new(Algorithm::HS256), &config.secret);

        assert_matches!(validate_token(&token, &config), Err(TokenError::InvalidUserId));
    }

    #[test]
    fn test_garbage_token_fails() {
        assert!(validate_token("not.a.jwt", &test_config()).is_err());
    }
}
