//!
//! # Authorization Gate
//!
//! Per-request middleware that runs the token checks in a fixed order and
//! short-circuits on the first failure:
//!
//! 1. a bearer token is present in the `Authorization` header
//! 2. its signature verifies against the server secret
//! 3. it has not expired
//! 4. its type matches what the wrapped route requires (access vs refresh)
//! 5. its jti is not in the revocation ledger and its issued-at is not
//!    before the account's bulk-revocation cutoff
//!
//! On success the decoded [`Claims`] are stored in the request extensions
//! for the extractors in [`crate::auth::extractors`]. Nothing is cached
//! across requests; every request re-runs the full sequence.
//!
//! Rejections go through the [`RejectionHooks`] strategy so the mapping from
//! failure to response can be swapped without touching the state machine.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::errors::ErrorKind;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::TokenType;
use crate::state::AppState;

/// Strategy for turning each gate failure into an error response.
pub trait RejectionHooks: Send + Sync {
    fn on_missing_token(&self) -> AppError {
        AppError::Unauthorized("Authorization token is missing".into())
    }

    fn on_invalid_token(&self) -> AppError {
        AppError::Unauthorized("Invalid token".into())
    }

    fn on_expired_token(&self) -> AppError {
        AppError::Unauthorized("Token has expired".into())
    }

    fn on_revoked_token(&self) -> AppError {
        AppError::Unauthorized("Token has been revoked".into())
    }
}

/// Default strategy: every failure is a 401 with a distinct message.
pub struct DefaultRejections;

impl RejectionHooks for DefaultRejections {}

/// Middleware factory. Wrap a scope or resource with `AuthGate::access()`
/// (ordinary API routes) or `AuthGate::refresh()` (the token refresh
/// endpoint). A refresh token is never accepted where an access token is
/// required, and vice versa.
pub struct AuthGate {
    required: TokenType,
    hooks: Arc<dyn RejectionHooks>,
}

impl AuthGate {
    pub fn access() -> Self {
        Self {
            required: TokenType::Access,
            hooks: Arc::new(DefaultRejections),
        }
    }

    pub fn refresh() -> Self {
        Self {
            required: TokenType::Refresh,
            hooks: Arc::new(DefaultRejections),
        }
    }

    pub fn with_hooks(required: TokenType, hooks: Arc<dyn RejectionHooks>) -> Self {
        Self { required, hooks }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            service: Rc::new(service),
            required: self.required,
            hooks: Arc::clone(&self.hooks),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    required: TokenType,
    hooks: Arc<dyn RejectionHooks>,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required = self.required;
        let hooks = Arc::clone(&self.hooks);

        Box::pin(async move {
            match authorize(&req, required, hooks.as_ref()).await {
                Ok(claims) => {
                    req.extensions_mut().insert::<Claims>(claims);
                    service.call(req).await.map(|res| res.map_into_left_body())
                }
                // Render the rejection here instead of bubbling an `Err`,
                // so the envelope is produced even without the http layer.
                Err(err) => {
                    let response = err.error_response().map_into_right_body();
                    Ok(req.into_response(response))
                }
            }
        })
    }
}

/// Runs the gate's check sequence, returning the decoded claims or the
/// rejection chosen by the hooks.
async fn authorize(
    req: &ServiceRequest,
    required: TokenType,
    hooks: &dyn RejectionHooks,
) -> Result<Claims, Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| Error::from(AppError::Internal("Application state missing".into())))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let token = match token {
        Some(token) => token,
        None => return Err(hooks.on_missing_token().into()),
    };

    let claims = match state.tokens.decode(token) {
        Ok(claims) => claims,
        Err(e) if *e.kind() == ErrorKind::ExpiredSignature => {
            return Err(hooks.on_expired_token().into())
        }
        Err(_) => return Err(hooks.on_invalid_token().into()),
    };

    if claims.token_type != required {
        return Err(hooks.on_invalid_token().into());
    }

    if state.storage.is_revoked(claims.jti).await? {
        return Err(hooks.on_revoked_token().into());
    }

    // Bulk revocation: a "tokens valid after" cutoff on the account
    // invalidates everything issued before it. An unresolvable
    // subject means the account was deleted; its tokens die with it.
    let account = match state.storage.account_by_id(claims.sub).await? {
        Some(account) => account,
        None => return Err(hooks.on_invalid_token().into()),
    };
    if let Some(cutoff) = account.tokens_valid_after {
        let issued_at = chrono::DateTime::from_timestamp(claims.iat, 0)
            .ok_or_else(|| Error::from(hooks.on_invalid_token()))?;
        if issued_at < cutoff {
            return Err(hooks.on_revoked_token().into());
        }
    }

    Ok(claims)
}
