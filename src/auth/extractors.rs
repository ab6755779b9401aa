use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// Extracts the authenticated account's ID from request extensions.
///
/// Intended for routes protected by the authorization gate, which validates
/// the token and stores the decoded claims in the request extensions. If no
/// claims are present the gate did not run; responding 401 is the safe
/// default.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedAccountId(pub i32);

impl FromRequest for AuthenticatedAccountId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthenticatedAccountId(claims.sub))),
            None => {
                let err = AppError::Unauthorized(
                    "Authentication required".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

/// Extracts the full token claims. Used by logout, which needs the jti,
/// type and expiry of the presented token to record the revocation.
#[derive(Debug, Clone)]
pub struct BearerClaims(pub Claims);

impl FromRequest for BearerClaims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(BearerClaims(claims))),
            None => {
                let err = AppError::Unauthorized(
                    "Authentication required".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
