use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{PublicProfile, UserInput, UserListQuery, UserUpdate},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Creates a user account without logging it in.
///
/// ## Responses:
/// - `201 Created`: The new user's `PrivateProfile` (id, username, email).
/// - `409 Conflict`: Username or email already taken.
/// - `422 Unprocessable Entity`: Payload fails validation.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    user_data: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;

    let user = state.users.create(user_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user.private_profile()))
}

/// Lists public profiles, paged with `limit` (default 100) and `offset` (default 0).
///
/// ## Responses:
/// - `200 OK`: JSON array of `PublicProfile`.
/// - `401 Unauthorized`: Missing or invalid bearer token.
/// - `422 Unprocessable Entity`: Negative `limit` or `offset`.
#[get("")]
pub async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<UserListQuery>,
    _caller: CurrentUser,
) -> Result<impl Responder, AppError> {
    let users = state.users.list(query.limit, query.offset).await?;
    let profiles: Vec<PublicProfile> = users.iter().map(|user| user.public_profile()).collect();
    Ok(HttpResponse::Ok().json(profiles))
}

#[get("/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
    _caller: CurrentUser,
) -> Result<impl Responder, AppError> {
    let user = state.users.get_by_id(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user.public_profile()))
}

/// Updates the fields present in the payload and returns the `PrivateProfile`.
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
    user_data: web::Json<UserUpdate>,
    _caller: CurrentUser,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;

    let user = state
        .users
        .update(user_id.into_inner(), user_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(user.private_profile()))
}

/// Deletes the user along with every task they own.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
    _caller: CurrentUser,
) -> Result<impl Responder, AppError> {
    state.users.delete(user_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_rt::test]
    async fn test_create_user_returns_private_profile() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::state::tests::memory_state()))
                .service(web::scope("/users").service(create_user)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(json!({
                "username": "alice",
                "email": "alice@x.com",
                "password": "password123"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["email"], "alice@x.com");
        assert!(body.get("hashed_password").is_none());
    }

    #[actix_rt::test]
    async fn test_list_requires_token() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::state::tests::memory_state()))
                .service(web::scope("/users").service(list_users)),
        )
        .await;

        let req = test::TestRequest::get().uri("/users").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
