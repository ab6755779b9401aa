use crate::{
    auth::{
        hash_password, verify_password, AuthenticatedAccountId, BearerClaims, LoginRequest,
        LoginResponse, RefreshResponse, RegisterRequest,
    },
    error::AppError,
    models::{account, TokenType},
    response,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

/// Register a new account.
///
/// The display name is trimmed and HTML-stripped, the email lowercased.
/// A duplicate email surfaces as 422 without creating a second row.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let name = account::sanitize_name(&register_data.name);
    let email = account::normalize_email(&register_data.email);
    let password_hash = hash_password(&register_data.password)?;

    let created = state
        .storage
        .create_account(&name, &email, &password_hash)
        .await?;

    log::info!("account registered: id={}", created.id);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Registration completed",
    })))
}

/// Authenticate with email and password, returning an access/refresh token
/// pair. Unknown email and wrong password produce the same 401 so the
/// response does not reveal which accounts exist.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let email = account::normalize_email(&login_data.email);
    let account = state
        .storage
        .account_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(&login_data.password, &account.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let (access_token, refresh_token) = state.tokens.issue_pair(account.id)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        message: "Login successful".into(),
        access_token,
        refresh_token,
    }))
}

/// Mint a new access token from a valid refresh token. The route is wrapped
/// with the refresh-typed gate, so access tokens are rejected here. The
/// refresh token itself is not rotated.
pub async fn refresh(
    state: web::Data<AppState>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    let access_token = state.tokens.issue(auth.0, TokenType::Access)?;

    Ok(HttpResponse::Ok().json(RefreshResponse {
        success: true,
        access_token,
    }))
}

/// Revoke the presented access token. Its jti stays in the ledger until the
/// token would have expired naturally; re-revoking is a no-op success.
pub async fn logout(
    state: web::Data<AppState>,
    claims: BearerClaims,
) -> Result<impl Responder, AppError> {
    let claims = claims.0;
    let expires_at = chrono::DateTime::from_timestamp(claims.exp, 0)
        .ok_or_else(|| AppError::Internal("Token carries an invalid expiry".into()))?;

    state
        .storage
        .revoke(claims.jti, claims.token_type, claims.sub, expires_at)
        .await?;

    log::info!("token revoked: account={} jti={}", claims.sub, claims.jti);

    Ok(response::ok_message("Logout successful"))
}

/// "Log out everywhere": set the account's tokens-valid-after cutoff so
/// every token issued before now is rejected, without per-token bookkeeping.
pub async fn logout_all(
    state: web::Data<AppState>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    state
        .storage
        .revoke_all_for_account(auth.0, Utc::now())
        .await?;

    log::info!("all tokens revoked for account={}", auth.0);

    Ok(response::ok_message("Logged out on all devices"))
}
