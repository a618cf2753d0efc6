use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{TaskInput, TaskQuery, TaskUpdate},
    state::AppState,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Retrieves the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `status` (optional): Only tasks with this status (`pending`, `in_progress`, `done`).
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task`, newest first. Empty when nothing matches.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    query_params: web::Query<TaskQuery>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = state
        .tasks
        .list_for_owner(user.id(), query_params.status)
        .await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// The task always starts as `pending`.
///
/// ## Responses:
/// - `201 Created`: The new `Task`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `422 Unprocessable Entity`: If the title is empty or longer than 255 characters.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    task_data: web::Json<TaskInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = state.tasks.create(user.id(), task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: The `Task`.
/// - `403 Forbidden`: The task belongs to someone else.
/// - `404 Not Found`: No task with this ID.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get(task_id.into_inner(), user.id()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task. Omitted fields are unchanged; `"description": null`
/// clears the description.
///
/// ## Responses:
/// - `200 OK`: The updated `Task`.
/// - `403 Forbidden`: The task belongs to someone else. Nothing is changed.
/// - `404 Not Found`: No task with this ID.
/// - `422 Unprocessable Entity`: Invalid title or status.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    apply_update(state, task_id.into_inner(), task_data.into_inner(), user).await
}

#[patch("/{id}")]
pub async fn patch_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    apply_update(state, task_id.into_inner(), task_data.into_inner(), user).await
}

async fn apply_update(
    state: web::Data<AppState>,
    task_id: Uuid,
    changes: TaskUpdate,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    changes.validate()?;

    let task = state.tasks.update(task_id, user.id(), changes).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `403 Forbidden`: The task belongs to someone else.
/// - `404 Not Found`: No task with this ID.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    state.tasks.delete(task_id.into_inner(), user.id()).await?;
    Ok(HttpResponse::NoContent().finish())
}
