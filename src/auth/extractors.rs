use actix_web::dev::Payload;
use actix_web::{http::header, web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// The authenticated caller, resolved from the `Authorization: Bearer` header.
///
/// Resolution verifies the access token and then loads the user it names, so a
/// token for a deleted account is rejected. Every failure becomes
/// `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

impl FromRequest for CurrentUser {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                AppError::Internal("AppState is not registered with the application".into())
            })?;
            let token = token.ok_or(AppError::Unauthorized)?;
            let user = state.auth.authenticate(&token).await?;
            Ok(CurrentUser(user))
        })
    }
}
