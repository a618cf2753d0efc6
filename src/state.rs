//! Shared application state, assembled once at startup.

use std::sync::Arc;

use actix_cors::Cors;

use crate::auth::{CredentialService, TokenService};
use crate::config::{AuthConfig, CorsConfig};
use crate::error::AppResult;
use crate::repository::{TaskRepository, UserRepository};
use crate::services::{AuthService, TaskService, UserService};

/// Everything a request handler needs. Cloning is cheap: the services only hold
/// `Arc`s and the bcrypt cost.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub tasks: TaskService,
}

impl AppState {
    pub fn new(
        config: &AuthConfig,
        user_repo: Arc<dyn UserRepository>,
        task_repo: Arc<dyn TaskRepository>,
    ) -> AppResult<Self> {
        let credentials = CredentialService::new(config.bcrypt_cost)?;
        let tokens = Arc::new(TokenService::new(config)?);

        let users = UserService::new(user_repo, credentials.clone());
        let auth = AuthService::new(users.clone(), tokens, credentials);
        let tasks = TaskService::new(task_repo);

        Ok(Self { auth, users, tasks })
    }
}

/// Builds the CORS middleware from the configured allow-lists and origin regex. A
/// `*` entry in any list allows everything for that dimension.
pub fn cors(config: &CorsConfig) -> Cors {
    let wildcard = |items: &[String]| items.iter().any(|item| item == "*");

    let mut cors = Cors::default().max_age(config.max_age);

    cors = if wildcard(&config.allow_origins) {
        cors.allow_any_origin()
    } else {
        config
            .allow_origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    };

    if let Some(regex) = config.allow_origin_regex.clone() {
        cors = cors.allowed_origin_fn(move |origin, _head| {
            origin.to_str().map_or(false, |origin| regex.is_match(origin))
        });
    }

    cors = if wildcard(&config.allow_methods) {
        cors.allow_any_method()
    } else {
        cors.allowed_methods(config.allow_methods.iter().map(String::as_str))
    };

    cors = if wildcard(&config.allow_headers) {
        cors.allow_any_header()
    } else {
        cors.allowed_headers(config.allow_headers.iter().map(String::as_str))
    };

    if wildcard(&config.expose_headers) {
        cors = cors.expose_any_header();
    } else if !config.expose_headers.is_empty() {
        cors = cors.expose_headers(config.expose_headers.iter().map(String::as_str));
    }

    if config.allow_credentials {
        cors = cors.supports_credentials();
    }
    cors
}
