use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes a raw password with bcrypt. The raw password is never stored.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, 12) // bcrypt default cost is 12
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verifies a raw password against a stored bcrypt hash. bcrypt re-derives
/// the hash with the embedded salt and compares in constant time.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}
