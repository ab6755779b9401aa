//!
//! In-memory storage used by the integration tests (and handy for local
//! experiments). Mirrors the Postgres implementation's observable behavior:
//! duplicate emails surface as `Conflict`, deletes cascade, listings are
//! ordered by id, and revocation is idempotent.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Account, Project, RevokedToken, Task, TaskStatus, TokenType};
use crate::storage::{CredentialStore, ProjectStore, RevocationLedger, Storage, TaskStore};

#[derive(Default)]
struct Inner {
    accounts: HashMap<i32, Account>,
    projects: HashMap<i32, Project>,
    tasks: HashMap<i32, Task>,
    revoked: HashMap<Uuid, RevokedToken>,
    next_account_id: i32,
    next_project_id: i32,
    next_task_id: i32,
}

#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_slice<T: Clone>(mut rows: Vec<T>, page: u32, per_page: u32) -> (Vec<T>, u64) {
    let total = rows.len() as u64;
    let start = (page.saturating_sub(1) as usize) * per_page as usize;
    let rows = if start >= rows.len() {
        Vec::new()
    } else {
        rows.drain(..).skip(start).take(per_page as usize).collect()
    };
    (rows, total)
}

#[async_trait]
impl CredentialStore for MemoryStorage {
    async fn create_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, AppError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.accounts.values().any(|a| a.email == email) {
            return Err(AppError::Conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        inner.next_account_id += 1;
        let now = Utc::now();
        let account = Account {
            id: inner.next_account_id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            tokens_valid_after: None,
            created_at: now,
            updated_at: now,
        };
        inner.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn account_by_id(&self, id: i32) -> Result<Option<Account>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.accounts.get(&id).cloned())
    }

    async fn list_accounts(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Account>, u64), AppError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Account> = inner.accounts.values().cloned().collect();
        rows.sort_by_key(|a| a.id);
        Ok(page_slice(rows, page, per_page))
    }

    async fn update_account(
        &self,
        id: i32,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, AppError> {
        let mut inner = self.inner.lock().unwrap();

        if inner
            .accounts
            .values()
            .any(|a| a.email == email && a.id != id)
        {
            return Err(AppError::Conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let account = inner
            .accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        account.name = name.to_string();
        account.email = email.to_string();
        account.password_hash = password_hash.to_string();
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn delete_account(&self, id: i32) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.accounts.remove(&id).is_none() {
            return Ok(false);
        }
        let project_ids: Vec<i32> = inner
            .projects
            .values()
            .filter(|p| p.account_id == id)
            .map(|p| p.id)
            .collect();
        for project_id in project_ids {
            inner.projects.remove(&project_id);
            inner.tasks.retain(|_, t| t.project_id != project_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl ProjectStore for MemoryStorage {
    async fn create_project(
        &self,
        account_id: i32,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_project_id += 1;
        let now = Utc::now();
        let project = Project {
            id: inner.next_project_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            account_id,
            created_at: now,
            updated_at: now,
        };
        inner.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn list_projects(
        &self,
        account_id: i32,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Project>, u64), AppError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Project> = inner
            .projects
            .values()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.id);
        Ok(page_slice(rows, page, per_page))
    }

    async fn project_by_id(&self, id: i32) -> Result<Option<Project>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.projects.get(&id).cloned())
    }

    async fn update_project(
        &self,
        id: i32,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let project = inner
            .projects
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Record not found".into()))?;
        project.name = name.to_string();
        project.description = description.map(str::to_string);
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: i32) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.projects.remove(&id).is_none() {
            return Ok(false);
        }
        inner.tasks.retain(|_, t| t.project_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TaskStore for MemoryStorage {
    async fn create_task(
        &self,
        project_id: i32,
        name: &str,
        description: Option<&str>,
        due_date: NaiveDate,
        status: TaskStatus,
    ) -> Result<Task, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: inner.next_task_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            due_date,
            status,
            project_id,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn tasks_by_project(&self, project_id: i32) -> Result<Vec<Task>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.id);
        Ok(rows)
    }

    async fn task_by_id(&self, id: i32) -> Result<Option<Task>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tasks.get(&id).cloned())
    }

    async fn update_task(
        &self,
        id: i32,
        name: &str,
        description: Option<&str>,
        due_date: NaiveDate,
        status: TaskStatus,
    ) -> Result<Task, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let task = inner
            .tasks
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Record not found".into()))?;
        task.name = name.to_string();
        task.description = description.map(str::to_string);
        task.due_date = due_date;
        task.status = status;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: i32) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.tasks.remove(&id).is_some())
    }
}

#[async_trait]
impl RevocationLedger for MemoryStorage {
    async fn revoke(
        &self,
        jti: Uuid,
        token_type: TokenType,
        account_id: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        // Idempotent: an existing entry stays untouched.
        inner.revoked.entry(jti).or_insert(RevokedToken {
            jti,
            token_type,
            account_id,
            expires_at,
            revoked_at: Utc::now(),
        });
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.revoked.contains_key(&jti))
    }

    async fn revoke_all_for_account(
        &self,
        account_id: i32,
        cutoff: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let account = inner
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        account.tokens_valid_after = Some(cutoff);
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.revoked.len();
        inner.revoked.retain(|_, entry| entry.expires_at >= now);
        Ok((before - inner.revoked.len()) as u64)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[actix_rt::test]
    async fn test_duplicate_email_conflict() {
        let storage = MemoryStorage::new();
        storage
            .create_account("John Doe", "john@example.com", "hash")
            .await
            .unwrap();

        let err = storage
            .create_account("Jane Doe", "john@example.com", "hash2")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // No second row was created
        let (accounts, total) = storage.list_accounts(1, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(accounts.len(), 1);
    }

    #[actix_rt::test]
    async fn test_revoke_is_idempotent() {
        let storage = MemoryStorage::new();
        let jti = Uuid::new_v4();
        let expires = Utc::now() + Duration::hours(1);

        storage
            .revoke(jti, TokenType::Access, 1, expires)
            .await
            .unwrap();
        storage
            .revoke(jti, TokenType::Access, 1, expires)
            .await
            .unwrap();

        assert!(storage.is_revoked(jti).await.unwrap());
    }

    #[actix_rt::test]
    async fn test_prune_removes_only_expired_entries() {
        let storage = MemoryStorage::new();
        let now = Utc::now();

        let stale = Uuid::new_v4();
        let live = Uuid::new_v4();
        storage
            .revoke(stale, TokenType::Access, 1, now - Duration::hours(1))
            .await
            .unwrap();
        storage
            .revoke(live, TokenType::Refresh, 1, now + Duration::days(29))
            .await
            .unwrap();

        let removed = storage.prune_expired(now).await.unwrap();
        assert_eq!(removed, 1);
        assert!(!storage.is_revoked(stale).await.unwrap());
        assert!(storage.is_revoked(live).await.unwrap());
    }

    #[actix_rt::test]
    async fn test_delete_project_cascades_tasks() {
        let storage = MemoryStorage::new();
        let account = storage
            .create_account("John Doe", "john@example.com", "hash")
            .await
            .unwrap();
        let project = storage
            .create_project(account.id, "Site", None)
            .await
            .unwrap();
        let task = storage
            .create_task(
                project.id,
                "Deploy",
                None,
                Utc::now().date_naive(),
                TaskStatus::Pending,
            )
            .await
            .unwrap();

        assert!(storage.delete_project(project.id).await.unwrap());
        assert!(storage.task_by_id(task.id).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_delete_account_cascades_projects_and_tasks() {
        let storage = MemoryStorage::new();
        let account = storage
            .create_account("John Doe", "john@example.com", "hash")
            .await
            .unwrap();
        let project = storage
            .create_project(account.id, "Site", None)
            .await
            .unwrap();
        storage
            .create_task(
                project.id,
                "Deploy",
                None,
                Utc::now().date_naive(),
                TaskStatus::Pending,
            )
            .await
            .unwrap();

        assert!(storage.delete_account(account.id).await.unwrap());
        assert!(storage.project_by_id(project.id).await.unwrap().is_none());
        assert!(storage.tasks_by_project(project.id).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_pagination() {
        let storage = MemoryStorage::new();
        let account = storage
            .create_account("John Doe", "john@example.com", "hash")
            .await
            .unwrap();
        for i in 0..25 {
            storage
                .create_project(account.id, &format!("Project {}", i), None)
                .await
                .unwrap();
        }

        let (page1, total) = storage.list_projects(account.id, 1, 10).await.unwrap();
        assert_eq!(total, 25);
        assert_eq!(page1.len(), 10);

        let (page3, _) = storage.list_projects(account.id, 3, 10).await.unwrap();
        assert_eq!(page3.len(), 5);

        let (page4, _) = storage.list_projects(account.id, 4, 10).await.unwrap();
        assert!(page4.is_empty());
    }
}
