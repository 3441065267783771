//! JWT Token handling

use chrono::{Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{User, UserRole};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Access token lifetime in minutes
    pub access_expiration_minutes: i64,
    /// Refresh token lifetime in hours
    pub refresh_expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl JwtConfig {
    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_expires_in(&self) -> i64 {
        self.access_expiration_minutes * 60
    }
}

/// Distinguishes the two kinds of token so one cannot stand in for the other.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    pub token_type: TokenType,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

impl TokenClaims {
    pub fn new(user: &User, token_type: TokenType, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => Duration::minutes(config.access_expiration_minutes),
            TokenType::Refresh => Duration::hours(config.refresh_expiration_hours),
        };

        Self {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            token_type,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }
}

/// Access + refresh tokens issued at login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Create a signed token of the given type for a user
pub fn create_token(
    user: &User,
    token_type: TokenType,
    config: &JwtConfig,
) -> Result<String, JwtError> {
    let token_claims = TokenClaims::new(user, token_type, config);

    encode(
        &Header::default(),
        &token_claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

pub fn issue_token_pair(user: &User, config: &JwtConfig) -> Result<TokenPair, JwtError> {
    Ok(TokenPair {
        access_token: create_token(user, TokenType::Access, config)?,
        refresh_token: create_token(user, TokenType::Refresh, config)?,
        expires_in: config.access_expires_in(),
    })
}

/// Verify a token's signature, issuer, expiry and type.
pub fn verify_token(
    token: &str,
    expected: TokenType,
    config: &JwtConfig,
) -> Result<TokenClaims, JwtError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    if token_data.claims.token_type != expected {
        return Err(ErrorKind::InvalidToken.into());
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            access_expiration_minutes: 15,
            refresh_expiration_hours: 24,
            issuer: "erp-access-test".into(),
        }
    }

    fn user() -> User {
        User {
            id: "user-123".into(),
            username: "manager1".into(),
            password_hash: "$2b$04$unused".into(),
            role: UserRole::Manager,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let config = config();
        let pair = issue_token_pair(&user(), &config).unwrap();
        assert_eq!(pair.expires_in, 900);

        let claims = verify_token(&pair.access_token, TokenType::Access, &config).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.username, "manager1");
        assert_eq!(claims.role, UserRole::Manager);

        let refresh = verify_token(&pair.refresh_token, TokenType::Refresh, &config).unwrap();
        assert!(refresh.exp > claims.exp);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let config = config();
        let pair = issue_token_pair(&user(), &config).unwrap();
        assert!(verify_token(&pair.refresh_token, TokenType::Access, &config).is_err());
        assert!(verify_token(&pair.access_token, TokenType::Refresh, &config).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = config();
        let mut claims = TokenClaims::new(&user(), TokenType::Access, &config);
        claims.iat -= 7200;
        claims.exp = Utc::now().timestamp() - 3600;
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        let err = verify_token(&token, TokenType::Access, &config).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ExpiredSignature);
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let token = create_token(&user(), TokenType::Access, &config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".into(),
            ..config()
        };
        assert!(verify_token(&token, TokenType::Access, &other).is_err());
        assert!(verify_token("invalid-token", TokenType::Access, &config()).is_err());
    }
}
