use crate::{
    auth::{hash_password, AuthenticatedAccountId},
    error::AppError,
    models::{account, AccountResponse, UpdateAccountRequest},
    response::{self, PageMeta},
    routes::projects::PageQuery,
    state::AppState,
};
use actix_web::{delete, get, put, web, Responder};
use validator::Validate;

/// List all user accounts, paginated. Password hashes never leave the
/// storage layer's `Account` type.
#[get("")]
pub async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
    _auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    let (page, per_page) = query.resolve()?;
    let (accounts, total) = state.storage.list_accounts(page, per_page).await?;

    let users: Vec<AccountResponse> = accounts.into_iter().map(AccountResponse::from).collect();

    Ok(response::ok_paginated(
        "Users retrieved successfully",
        users,
        PageMeta::new(page, per_page, total),
    ))
}

/// Retrieve a single user's public profile.
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
    _auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    let account = state
        .storage
        .account_by_id(user_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(response::ok(
        "User retrieved successfully",
        AccountResponse::from(account),
    ))
}

/// Update a profile. Accounts can only modify themselves; the password is
/// re-hashed before storage.
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
    update_data: web::Json<UpdateAccountRequest>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    if user_id != auth.0 {
        return Err(AppError::Forbidden(
            "You can only modify your own account".into(),
        ));
    }

    update_data.validate()?;

    let name = account::sanitize_name(&update_data.name);
    let email = account::normalize_email(&update_data.email);
    let password_hash = hash_password(&update_data.password)?;

    let updated = state
        .storage
        .update_account(user_id, &name, &email, &password_hash)
        .await?;

    Ok(response::ok(
        "User updated successfully",
        AccountResponse::from(updated),
    ))
}

/// Delete an account and, by cascade, its projects and their tasks.
/// Self-service only.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: web::Path<i32>,
    auth: AuthenticatedAccountId,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    if user_id != auth.0 {
        return Err(AppError::Forbidden(
            "You can only delete your own account".into(),
        ));
    }

    if !state.storage.delete_account(user_id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(response::ok_message("User successfully deleted"))
}
