#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{http::header, test, web, App};
use jsonwebtoken::Algorithm;
use serde_json::{json, Value};
use tasktrack::auth::TokenPair;
use tasktrack::config::AuthConfig;
use tasktrack::repository::InMemoryStore;
use tasktrack::{routes, AppState};

pub const PASSWORD: &str = "password123";

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        secret_key: "integration-test-secret".to_string(),
        algorithm: Algorithm::HS256,
        access_token_expire_minutes: 30,
        refresh_token_expire_days: 7,
        bcrypt_cost: 4,
    }
}

/// Application state over a fresh in-memory store. The store is returned too so
/// tests can inspect what was persisted.
pub fn test_state() -> (Arc<InMemoryStore>, AppState) {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(&auth_config(), store.clone(), store.clone())
        .expect("test state should build");
    (store, state)
}

pub async fn init_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::config),
    )
    .await
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn register<S, B>(app: &S, username: &str) -> TokenPair
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": PASSWORD
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registering {} failed", username);
    test::read_body_json(resp).await
}

pub async fn create_task<S, B>(app: &S, token: &str, title: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .insert_header(bearer(token))
        .set_json(json!({ "title": title }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "creating task {} failed", title);
    test::read_body_json(resp).await
}
