pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::error::AppError;

/// Registers every endpoint: `/health` at the root and the API under `/api/v1`.
pub fn config(cfg: &mut web::ServiceConfig) {
    json_config(cfg);
    cfg.service(health::health).service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth")
                    .service(auth::register)
                    .service(auth::login)
                    .service(auth::refresh),
            )
            .service(
                web::scope("/users")
                    .service(users::create_user)
                    .service(users::list_users)
                    .service(users::get_user)
                    .service(users::update_user)
                    .service(users::delete_user),
            )
            .service(
                web::scope("/tasks")
                    .service(tasks::get_tasks)
                    .service(tasks::create_task)
                    .service(tasks::get_task)
                    .service(tasks::update_task)
                    .service(tasks::patch_task)
                    .service(tasks::delete_task),
            ),
    );
}

/// Makes body and query deserialization failures validation errors, so they share
/// the 422 response and error body of `validator` failures.
pub fn json_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    );
}
