use crate::error::AppError;
use crate::models::TokenType;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access tokens authorize API calls and live for one hour.
pub const ACCESS_TOKEN_LIFETIME_HOURS: i64 = 1;
/// Refresh tokens mint new access tokens and live for thirty days.
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 30;

/// Represents the claims encoded within a JWT.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the account's unique identifier.
    pub sub: i32,
    /// Unique token identifier, used as the revocation key.
    pub jti: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Whether this is an access or a refresh token.
    pub token_type: TokenType,
}

/// Signs and verifies tokens with a server-held secret.
///
/// Constructed once from [`crate::config::Config`] and injected into the
/// application state; nothing reads the secret from the environment at
/// request time.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mints a signed token of the given type for an account. Each call
    /// produces a fresh jti.
    pub fn issue(&self, account_id: i32, token_type: TokenType) -> Result<String, AppError> {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => Duration::hours(ACCESS_TOKEN_LIFETIME_HOURS),
            TokenType::Refresh => Duration::days(REFRESH_TOKEN_LIFETIME_DAYS),
        };

        let claims = Claims {
            sub: account_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            token_type,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Mints the (access, refresh) pair handed out at login.
    pub fn issue_pair(&self, account_id: i32) -> Result<(String, String), AppError> {
        let access = self.issue(account_id, TokenType::Access)?;
        let refresh = self.issue(account_id, TokenType::Refresh)?;
        Ok((access, refresh))
    }

    /// Verifies the signature and expiry of a token and decodes its claims.
    ///
    /// The raw `jsonwebtoken` error is returned so callers can distinguish
    /// an expired token from a malformed or forged one.
    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default()).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("unit-test-secret")
    }

    #[test]
    fn test_issue_and_decode_access_token() {
        let token = issuer().issue(42, TokenType::Access).unwrap();
        let claims = issuer().decode(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.token_type, TokenType::Access);
        // 1 hour lifetime
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_refresh_token_lifetime() {
        let token = issuer().issue(7, TokenType::Refresh).unwrap();
        let claims = issuer().decode(&token).unwrap();

        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 3600);
    }

    #[test]
    fn test_each_token_gets_fresh_jti() {
        let issuer = issuer();
        let a = issuer.decode(&issuer.issue(1, TokenType::Access).unwrap()).unwrap();
        let b = issuer.decode(&issuer.issue(1, TokenType::Access).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let now = Utc::now();
        let claims = Claims {
            sub: 1,
            jti: Uuid::new_v4(),
            iat: (now - Duration::hours(3)).timestamp(),
            exp: (now - Duration::hours(2)).timestamp(),
            token_type: TokenType::Access,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("unit-test-secret".as_bytes()),
        )
        .unwrap();

        match issuer.decode(&token) {
            Err(e) => assert_eq!(*e.kind(), ErrorKind::ExpiredSignature),
            Ok(_) => panic!("Token should have been rejected as expired"),
        }
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenIssuer::new("other-secret")
            .issue(1, TokenType::Access)
            .unwrap();

        match issuer().decode(&token) {
            Err(e) => assert_eq!(*e.kind(), ErrorKind::InvalidSignature),
            Ok(_) => panic!("Token signed with a different secret should not verify"),
        }
    }
}
