use crate::{
    auth::{LoginRequest, RefreshRequest, RegisterRequest},
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates the account and returns an access/refresh token pair.
///
/// ## Responses:
/// - `201 Created`: `TokenPair` for the new account.
/// - `409 Conflict`: If the username or email is already taken.
/// - `422 Unprocessable Entity`: If the payload fails validation.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let tokens = state.auth.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(tokens))
}

/// Login user
///
/// Exchanges a username and password for a token pair.
///
/// ## Responses:
/// - `200 OK`: `TokenPair`.
/// - `401 Unauthorized`: Bad credentials. Unknown users and wrong passwords get
///   the same response.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let tokens = state.auth.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// Refresh tokens
///
/// Trades a refresh token for a new pair. Access tokens are rejected here.
///
/// ## Responses:
/// - `200 OK`: `TokenPair`.
/// - `401 Unauthorized`: Invalid, expired or wrong kind of token, or the account
///   is gone.
#[post("/refresh")]
pub async fn refresh(
    state: web::Data<AppState>,
    refresh_data: web::Json<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    refresh_data.validate()?;

    let tokens = state.auth.refresh(&refresh_data.refresh_token).await?;
    Ok(HttpResponse::Ok().json(tokens))
}
