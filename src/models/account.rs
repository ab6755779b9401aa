use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

lazy_static! {
    static ref HTML_TAG_REGEX: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// An account row as stored in the database.
///
/// `tokens_valid_after` is the bulk-revocation cutoff: any token issued
/// before this instant is rejected by the authorization gate, regardless of
/// whether its jti was revoked individually.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub tokens_valid_after: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The public view of an account, returned by the API. The password hash and
/// revocation cutoff never leave the server.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Payload for updating an account's profile. All fields are required; the
/// password is re-hashed before storage.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(custom = "validate_name")]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(custom = "validate_password")]
    pub password: String,
}

/// Strips HTML tags and surrounding whitespace from a display name.
pub fn sanitize_name(raw: &str) -> String {
    HTML_TAG_REGEX.replace_all(raw, "").trim().to_string()
}

/// Lowercases and trims an email for storage and lookup. Uniqueness is
/// case-insensitive because every email passes through here first.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A display name must be 2-100 characters once tags and whitespace are
/// stripped.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let cleaned = sanitize_name(name);
    let length = cleaned.chars().count();
    if !(2..=100).contains(&length) {
        let mut err = ValidationError::new("name_length");
        err.message = Some("must be between 2 and 100 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Passwords must be 8-128 characters and contain at least one letter and
/// one digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if !(8..=128).contains(&length) {
        let mut err = ValidationError::new("password_length");
        err.message = Some("must be between 8 and 128 characters".into());
        return Err(err);
    }
    if !password.chars().any(|c| c.is_alphabetic()) || !password.chars().any(|c| c.is_ascii_digit())
    {
        let mut err = ValidationError::new("password_strength");
        err.message = Some("must contain at least one letter and one digit".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name_strips_tags() {
        assert_eq!(sanitize_name("  John Doe  "), "John Doe");
        assert_eq!(sanitize_name("<script>x</script>John"), "xJohn");
        assert_eq!(sanitize_name("<b>Jane</b> Roe"), "Jane Roe");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" John@Example.COM "), "john@example.com");
    }

    #[test]
    fn test_validate_name_length_after_stripping() {
        assert!(validate_name("Jo").is_ok());
        assert!(validate_name("J").is_err());
        // Tags do not count toward the length
        assert!(validate_name("<b></b>J").is_err());
        assert!(validate_name(&"a".repeat(101)).is_err());
        assert!(validate_name(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_password_rules() {
        assert!(validate_password("SecurePass123").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("nodigitshere").is_err());
        assert!(validate_password("1234567890").is_err());
        assert!(validate_password(&format!("a1{}", "x".repeat(127))).is_err());
    }

    #[test]
    fn test_account_response_hides_password_hash() {
        let account = Account {
            id: 1,
            name: "John Doe".into(),
            email: "john@example.com".into(),
            password_hash: "$2b$12$secret".into(),
            tokens_valid_after: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(AccountResponse::from(account)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "john@example.com");
    }
}
