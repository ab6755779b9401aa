pub mod extractors;
pub mod gate;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export the pieces handlers and tests reach for most often.
pub use extractors::{AuthenticatedAccountId, BearerClaims};
pub use gate::{AuthGate, DefaultRejections, RejectionHooks};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer};

/// Payload for a new account registration.
///
/// Name and password rules live in [`crate::models::account`] so the profile
/// update endpoint applies the same constraints.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name, 2-100 characters after trimming and HTML-stripping.
    #[validate(custom = "crate::models::account::validate_name")]
    pub name: String,
    /// Email address; lowercased before storage and lookup.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// 8-128 characters with at least one letter and one digit.
    #[validate(custom = "crate::models::account::validate_password")]
    pub password: String,
}

/// Payload for a login request. Credentials are checked against the store;
/// format constraints beyond presence are not enforced here.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Response to a successful login: the access/refresh token pair.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Response to a successful token refresh. The refresh token itself is not
/// rotated.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub access_token: String,
}
