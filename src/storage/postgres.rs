//!
//! Postgres-backed storage. All queries are runtime-checked (`query_as` with
//! bound parameters) so the crate builds without a live database; the schema
//! lives in `migrations/schema.sql`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Account, Project, Task, TaskStatus, TokenType};
use crate::storage::{CredentialStore, ProjectStore, RevocationLedger, Storage, TaskStore};

const ACCOUNT_COLUMNS: &str =
    "id, name, email, password_hash, tokens_valid_after, created_at, updated_at";
const PROJECT_COLUMNS: &str = "id, name, description, account_id, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, name, description, due_date, status, project_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgStorage {
    async fn create_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, AppError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (name, email, password_hash) \
             VALUES ($1, $2, $3) RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict(format!("Email '{}' is already registered", email))
            }
            other => other,
        })?;

        Ok(account)
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn account_by_id(&self, id: i32) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn list_accounts(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Account>, u64), AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;

        let offset = (page.saturating_sub(1) as i64) * per_page as i64;
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts ORDER BY id LIMIT $1 OFFSET $2",
            ACCOUNT_COLUMNS
        ))
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((accounts, total as u64))
    }

    async fn update_account(
        &self,
        id: i32,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, AppError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "UPDATE accounts SET name = $1, email = $2, password_hash = $3, updated_at = NOW() \
             WHERE id = $4 RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict(format!("Email '{}' is already registered", email))
            }
            AppError::NotFound(_) => AppError::NotFound("User not found".into()),
            other => other,
        })?;

        Ok(account)
    }

    async fn delete_account(&self, id: i32) -> Result<bool, AppError> {
        // ON DELETE CASCADE removes the account's projects and their tasks.
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProjectStore for PgStorage {
    async fn create_project(
        &self,
        account_id: i32,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (name, description, account_id) \
             VALUES ($1, $2, $3) RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(name)
        .bind(description)
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    async fn list_projects(
        &self,
        account_id: i32,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Project>, u64), AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE account_id = $1")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await?;

        let offset = (page.saturating_sub(1) as i64) * per_page as i64;
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE account_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            PROJECT_COLUMNS
        ))
        .bind(account_id)
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((projects, total as u64))
    }

    async fn project_by_id(&self, id: i32) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn update_project(
        &self,
        id: i32,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects SET name = $1, description = $2, updated_at = NOW() \
             WHERE id = $3 RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(name)
        .bind(description)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    async fn delete_project(&self, id: i32) -> Result<bool, AppError> {
        // ON DELETE CASCADE removes the project's tasks.
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskStore for PgStorage {
    async fn create_task(
        &self,
        project_id: i32,
        name: &str,
        description: Option<&str>,
        due_date: NaiveDate,
        status: TaskStatus,
    ) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (name, description, due_date, status, project_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(name)
        .bind(description)
        .bind(due_date)
        .bind(status)
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn tasks_by_project(&self, project_id: i32) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE project_id = $1 ORDER BY id",
            TASK_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn task_by_id(&self, id: i32) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update_task(
        &self,
        id: i32,
        name: &str,
        description: Option<&str>,
        due_date: NaiveDate,
        status: TaskStatus,
    ) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET name = $1, description = $2, due_date = $3, status = $4, \
             updated_at = NOW() WHERE id = $5 RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(name)
        .bind(description)
        .bind(due_date)
        .bind(status)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn delete_task(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RevocationLedger for PgStorage {
    async fn revoke(
        &self,
        jti: Uuid,
        token_type: TokenType,
        account_id: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        // ON CONFLICT DO NOTHING makes double-logout a no-op success.
        sqlx::query(
            "INSERT INTO revoked_tokens (jti, token_type, account_id, expires_at) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(token_type)
        .bind(account_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM revoked_tokens WHERE jti = $1")
            .bind(jti)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    async fn revoke_all_for_account(
        &self,
        account_id: i32,
        cutoff: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE accounts SET tokens_valid_after = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(cutoff)
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }

        Ok(())
    }

    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
