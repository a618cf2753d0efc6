#![doc = "The `tasktrack` library crate."]
#![doc = ""]
#![doc = "Domain models, credential and token services, storage adapters, the user, auth"]
#![doc = "and task services, routing configuration and error handling for the TaskTrack"]
#![doc = "backend. The binary (`main.rs`) only wires configuration, the Postgres pool and"]
#![doc = "these pieces together."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};
pub use crate::state::AppState;
