use actix_web::{get, web, HttpResponse, Responder};
use lazy_static::lazy_static;
use serde_json::json;
use std::time::Instant;

use crate::state::AppState;

lazy_static! {
    /// Process start reference for the uptime report. `main` touches this
    /// at boot so the clock starts before the first request.
    pub static ref APP_START: Instant = Instant::now();
}

/// Health check endpoint for monitoring. Reports uptime and storage
/// connectivity; 503 when storage is unreachable.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let uptime = APP_START.elapsed().as_secs_f64();

    match state.storage.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "database": "connected",
            "uptime_seconds": (uptime * 100.0).round() / 100.0,
        })),
        Err(e) => {
            log::error!("health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "uptime_seconds": (uptime * 100.0).round() / 100.0,
            }))
        }
    }
}

/// Readiness check for container orchestration.
#[get("/ready")]
pub async fn ready(state: web::Data<AppState>) -> impl Responder {
    match state.storage.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "ready": true })),
        Err(_) => HttpResponse::ServiceUnavailable().json(json!({ "ready": false })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenIssuer;
    use crate::storage::MemoryStorage;
    use actix_web::{test, App};
    use std::sync::Arc;

    fn test_state() -> web::Data<AppState> {
        web::Data::new(AppState::new(
            Arc::new(MemoryStorage::new()),
            TokenIssuer::new("health-test-secret"),
        ))
    }

    #[actix_rt::test]
    async fn test_health_endpoint() {
        let app = test::init_service(App::new().app_data(test_state()).service(health)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["status"], "healthy");
        assert_eq!(json["database"], "connected");
        assert!(json["uptime_seconds"].is_number());
    }

    #[actix_rt::test]
    async fn test_ready_endpoint() {
        let app = test::init_service(App::new().app_data(test_state()).service(ready)).await;

        let req = test::TestRequest::get().uri("/ready").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["ready"], true);
    }
}
