use std::io;
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use tasktrack::repository::{PgTaskRepository, PgUserRepository};
use tasktrack::{routes, state, AppState, Config};

fn startup_error<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> io::Error + '_ {
    move |e| {
        log::error!("{}: {}", context, e);
        io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, e))
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error("Invalid configuration"))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(startup_error("Failed to connect to database"))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(startup_error("Failed to run migrations"))?;

    let app_state = AppState::new(
        &config.auth,
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgTaskRepository::new(pool)),
    )
    .map_err(startup_error("Failed to build application state"))?;

    log::info!("Starting TaskTrack server at {}", config.server_url());

    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(state::cors(&cors_config))
            .wrap(Logger::default())
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
