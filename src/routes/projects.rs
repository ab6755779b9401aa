use crate::{
    auth::AuthenticatedAccountId,
    error::AppError,
    models::{Project, ProjectInput},
    response::{self, PageMeta},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use validator::Validate;

/// Pagination parameters shared by the listing endpoints.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Resolves defaults (page 1, 10 per page) and rejects out-of-range
    /// values with a 422.
    pub fn resolve(&self) -> Result<(u32, u32), AppError> {
        let page = self.page.unwrap_or(1);
        let per_page = self.per_page.unwrap_or(10);
        if page < 1 || per_page < 1 || per_page > 100 {
            return Err(AppError::Validation {
                message: "Invalid pagination parameter".into(),
                details: vec!["page must be >= 1 and per_page between 1 and 100".into()],
            });
        }
        Ok((page, per_page))
    }
}

/// Looks up a project and confirms the authenticated account owns it.
/// Missing project: 404. Someone else's project: 403.
async fn owned_project(
    state: &AppState,
    project_id: i32,
    account_id: i32,
) -> Result<Project, AppError> {
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

    Ok(project)
}

/// List the authenticated account's projects, paginated.
#[get("")]
pub async fn list_projects(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    let (page, per_page) = query.resolve()?;
    let (projects, total) = state.storage.list_projects(auth.0, page, per_page).await?;

    Ok(response::ok_paginated(
        "Projects retrieved successfully",
        projects,
        PageMeta::new(page, per_page, total),
    ))
}

/// Create a project owned by the authenticated account.
#[post("")]
pub async fn create_project(
    state: web::Data<AppState>,
    project_data: web::Json<ProjectInput>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    project_data.validate()?;

    let project = state
        .storage
        .create_project(
            auth.0,
            &project_data.name,
            project_data.description.as_deref(),
        )
        .await?;

    Ok(response::created("Project created successfully", project))
}

/// Retrieve a single project. Only the owner can see it.
#[get("/{id}")]
pub async fn get_project(
    state: web::Data<AppState>,
    project_id: web::Path<i32>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    let project = owned_project(&state, project_id.into_inner(), auth.0).await?;

    Ok(response::ok("Project retrieved successfully", project))
}

/// Update a project's name and description. Ownership never changes.
#[put("/{id}")]
pub async fn update_project(
    state: web::Data<AppState>,
    project_id: web::Path<i32>,
    project_data: web::Json<ProjectInput>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    project_data.validate()?;

    let project = owned_project(&state, project_id.into_inner(), auth.0).await?;
    let updated = state
        .storage
        .update_project(
            project.id,
            &project_data.name,
            project_data.description.as_deref(),
        )
        .await?;

    Ok(response::ok("Project updated successfully", updated))
}

/// Delete a project and, by cascade, its tasks.
#[delete("/{id}")]
pub async fn delete_project(
    state: web::Data<AppState>,
    project_id: web::Path<i32>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    let project = owned_project(&state, project_id.into_inner(), auth.0).await?;
    state.storage.delete_project(project.id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// List all tasks belonging to one of the caller's projects.
#[get("/{id}/tasks")]
pub async fn list_project_tasks(
    state: web::Data<AppState>,
    project_id: web::Path<i32>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    let project = owned_project(&state, project_id.into_inner(), auth.0).await?;
    let tasks = state.storage.tasks_by_project(project.id).await?;

    Ok(response::ok("Tasks retrieved successfully", tasks))
}
