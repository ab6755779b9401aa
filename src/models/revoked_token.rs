use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Discriminates access tokens from refresh tokens, both in claims and in
/// the revocation ledger. Corresponds to the `token_type` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "token_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// A ledger entry marking a token identifier as permanently invalid.
///
/// Entries whose `expires_at` has passed carry no information anymore (the
/// token would be rejected as expired anyway) and are removed by the
/// periodic sweep.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RevokedToken {
    pub jti: Uuid,
    pub token_type: TokenType,
    pub account_id: i32,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_type_serialization() {
        assert_eq!(
            serde_json::to_value(TokenType::Access).unwrap(),
            serde_json::json!("access")
        );
        assert_eq!(
            serde_json::from_value::<TokenType>(serde_json::json!("refresh")).unwrap(),
            TokenType::Refresh
        );
        assert_eq!(TokenType::Refresh.to_string(), "refresh");
    }
}
