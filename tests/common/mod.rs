#![allow(dead_code)] // not every test binary uses every helper

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use serde_json::json;
use std::sync::Arc;

use taskplane::auth::{LoginResponse, TokenIssuer};
use taskplane::routes;
use taskplane::state::AppState;
use taskplane::storage::MemoryStorage;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Builds the full application over an in-memory storage, so the entire
/// HTTP surface (gate middleware included) runs without a database.
pub async fn init_app(
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    let state = web::Data::new(AppState::new(
        Arc::new(MemoryStorage::new()),
        TokenIssuer::new(TEST_SECRET),
    ));

    test::init_service(
        App::new()
            .app_data(state)
            .app_data(routes::json_config())
            .service(routes::health::health)
            .service(routes::health::ready)
            .service(web::scope("/api").configure(routes::config)),
    )
    .await
}

pub struct TestUser {
    pub access_token: String,
    pub refresh_token: String,
}

pub async fn register_user<S>(app: &S, name: &str, email: &str, password: &str) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "name": name, "email": email, "password": password }))
        .to_request();
    test::call_service(app, req).await
}

pub async fn login_user<S>(app: &S, email: &str, password: &str) -> LoginResponse
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login failed for {}", email);
    test::read_body_json(resp).await
}

/// Registers a fresh user and logs them in, returning the token pair.
pub async fn register_and_login<S>(app: &S, name: &str, email: &str, password: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let resp = register_user(app, name, email, password).await;
    assert_eq!(resp.status(), 201, "registration failed for {}", email);

    let login = login_user(app, email, password).await;
    TestUser {
        access_token: login.access_token,
        refresh_token: login.refresh_token,
    }
}

/// Creates a project for the given user, returning its id.
pub async fn create_project<S>(app: &S, token: &str, name: &str, description: &str) -> i32
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "name": name, "description": description }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "project creation failed");

    let body: serde_json::Value = test::read_body_json(resp).await;
    body["data"]["id"].as_i64().expect("project id missing") as i32
}

/// GET a path with a bearer token and return the raw response.
pub async fn authed_get<S>(app: &S, token: &str, path: &str) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
{
    let req = test::TestRequest::get()
        .uri(path)
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    test::call_service(app, req).await
}
