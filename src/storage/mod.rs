//!
//! # Storage Abstraction
//!
//! Persistence is reached through the traits below rather than a shared
//! global pool. `main` constructs a [`PgStorage`] and hands it to the
//! request handlers inside [`crate::state::AppState`]; the integration tests
//! swap in a [`MemoryStorage`] instead so the full HTTP surface can be
//! exercised without a running database.
//!
//! Each trait corresponds to one component of the authorization model:
//! credentials, projects, tasks and the token revocation ledger.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Account, Project, Task, TaskStatus, TokenType};

/// Persists account identities and their password hashes.
#[async_trait]
pub trait CredentialStore {
    /// Inserts a new account. The email must already be normalized
    /// (lowercased); a duplicate surfaces as [`AppError::Conflict`].
    async fn create_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, AppError>;

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    async fn account_by_id(&self, id: i32) -> Result<Option<Account>, AppError>;

    /// Page through all accounts. Returns the page plus the total row count.
    async fn list_accounts(&self, page: u32, per_page: u32)
        -> Result<(Vec<Account>, u64), AppError>;

    async fn update_account(
        &self,
        id: i32,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, AppError>;

    /// Deletes an account and, by cascade, its projects and their tasks.
    /// Returns false when no such account exists.
    async fn delete_account(&self, id: i32) -> Result<bool, AppError>;
}

/// Persists projects. Ownership is fixed at creation.
#[async_trait]
pub trait ProjectStore {
    async fn create_project(
        &self,
        account_id: i32,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, AppError>;

    /// Page through the projects owned by one account.
    async fn list_projects(
        &self,
        account_id: i32,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Project>, u64), AppError>;

    async fn project_by_id(&self, id: i32) -> Result<Option<Project>, AppError>;

    async fn update_project(
        &self,
        id: i32,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, AppError>;

    /// Deletes a project and its tasks. Returns false when absent.
    async fn delete_project(&self, id: i32) -> Result<bool, AppError>;
}

/// Persists tasks, each belonging to exactly one live project.
#[async_trait]
pub trait TaskStore {
    async fn create_task(
        &self,
        project_id: i32,
        name: &str,
        description: Option<&str>,
        due_date: NaiveDate,
        status: TaskStatus,
    ) -> Result<Task, AppError>;

    async fn tasks_by_project(&self, project_id: i32) -> Result<Vec<Task>, AppError>;

    async fn task_by_id(&self, id: i32) -> Result<Option<Task>, AppError>;

    async fn update_task(
        &self,
        id: i32,
        name: &str,
        description: Option<&str>,
        due_date: NaiveDate,
        status: TaskStatus,
    ) -> Result<Task, AppError>;

    async fn delete_task(&self, id: i32) -> Result<bool, AppError>;
}

/// Records tokens that must be treated as invalid before their natural
/// expiry. Once present, an entry never becomes valid again.
#[async_trait]
pub trait RevocationLedger {
    /// Marks a jti as revoked. Revoking an already-revoked jti is a no-op
    /// success.
    async fn revoke(
        &self,
        jti: Uuid,
        token_type: TokenType,
        account_id: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError>;

    /// Sets the account-wide cutoff: every token issued before `cutoff`
    /// becomes invalid without per-token bookkeeping ("log out everywhere").
    async fn revoke_all_for_account(
        &self,
        account_id: i32,
        cutoff: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Removes ledger entries whose tokens have expired naturally. Returns
    /// the number of rows removed. Keeps ledger growth bounded by the
    /// maximum token lifetime.
    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

/// The full storage surface a backend must provide.
#[async_trait]
pub trait Storage:
    CredentialStore + ProjectStore + TaskStore + RevocationLedger + Send + Sync
{
    /// Connectivity probe for the health and readiness endpoints.
    async fn ping(&self) -> Result<(), AppError>;
}
