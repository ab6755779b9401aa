use crate::{
    auth::AuthenticatedAccountId,
    error::AppError,
    models::{Task, TaskCreateInput, TaskUpdateInput},
    response,
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Confirms the authenticated account owns the project a task belongs (or
/// would belong) to. Task ownership is transitive through the project.
async fn ensure_project_owner(
    state: &AppState,
    project_id: i32,
    account_id: i32,
) -> Result<(), AppError> {
    let project = state
        .storage
        .project_by_id(project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    if project.account_id != account_id {
        return Err(AppError::Forbidden(
            "You do not have permission to access this project".into(),
        ));
    }

    Ok(())
}

/// Fetches a task and verifies ownership through its project.
async fn owned_task(state: &AppState, task_id: i32, account_id: i32) -> Result<Task, AppError> {
    let task = state
        .storage
        .task_by_id(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    ensure_project_owner(state, task.project_id, account_id).await?;

    Ok(task)
}

/// Create a task in one of the caller's projects. The due date must not be
/// in the past; on a validation failure no row is written.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    task_data: web::Json<TaskCreateInput>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    ensure_project_owner(&state, task_data.project_id, auth.0).await?;

    let task = state
        .storage
        .create_task(
            task_data.project_id,
            &task_data.name,
            task_data.description.as_deref(),
            task_data.due_date,
            task_data.status.unwrap_or_default(),
        )
        .await?;

    Ok(response::created("Task created successfully", task))
}

/// Retrieve a single task.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<i32>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    let task = owned_task(&state, task_id.into_inner(), auth.0).await?;

    Ok(response::ok("Task retrieved successfully", task))
}

/// Update a task. The owning project cannot be changed, and past due dates
/// are allowed here so overdue tasks remain editable.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskUpdateInput>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = owned_task(&state, task_id.into_inner(), auth.0).await?;
    let updated = state
        .storage
        .update_task(
            task.id,
            &task_data.name,
            task_data.description.as_deref(),
            task_data.due_date,
            task_data.status.unwrap_or(task.status),
        )
        .await?;

    Ok(response::ok("Task updated successfully", updated))
}

/// Delete a task.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    task_id: web::Path<i32>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    let task = owned_task(&state, task_id.into_inner(), auth.0).await?;
    state.storage.delete_task(task.id).await?;

    Ok(HttpResponse::NoContent().finish())
}
