use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has not been started yet.
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task is finished.
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

/// A task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub project_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task. The due date must not be in the past at
/// creation time; updates are exempt so overdue tasks can still be edited.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskCreateInput {
    #[validate(length(min = 1, max = 128, message = "must be between 1 and 128 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: Option<String>,

    /// Due date in `YYYY-MM-DD` form.
    #[validate(custom = "validate_due_date")]
    pub due_date: NaiveDate,

    /// Defaults to `pending` when omitted.
    pub status: Option<TaskStatus>,

    pub project_id: i32,
}

/// Input for updating a task. The owning project cannot be changed.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskUpdateInput {
    #[validate(length(min = 1, max = 128, message = "must be between 1 and 128 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: Option<String>,

    pub due_date: NaiveDate,

    pub status: Option<TaskStatus>,
}

fn validate_due_date(due_date: &NaiveDate) -> Result<(), ValidationError> {
    if *due_date < Utc::now().date_naive() {
        let mut err = ValidationError::new("due_date_past");
        err.message = Some("Due date must not be earlier than the current date".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            serde_json::json!("in_progress")
        );
        assert_eq!(
            serde_json::from_value::<TaskStatus>(serde_json::json!("completed")).unwrap(),
            TaskStatus::Completed
        );
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
    }

    #[test]
    fn test_due_date_must_not_be_past() {
        let today = Utc::now().date_naive();

        let valid = TaskCreateInput {
            name: "Write docs".to_string(),
            description: None,
            due_date: today,
            status: None,
            project_id: 1,
        };
        assert!(valid.validate().is_ok());

        let past = TaskCreateInput {
            name: "Write docs".to_string(),
            description: None,
            due_date: today - Duration::days(1),
            status: None,
            project_id: 1,
        };
        assert!(past.validate().is_err());
    }

    #[test]
    fn test_update_allows_past_due_date() {
        let update = TaskUpdateInput {
            name: "Write docs".to_string(),
            description: None,
            due_date: Utc::now().date_naive() - chrono::Duration::days(30),
            status: Some(TaskStatus::Completed),
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_task_name_validation() {
        let empty = TaskCreateInput {
            name: "".to_string(),
            description: None,
            due_date: Utc::now().date_naive(),
            status: None,
            project_id: 1,
        };
        assert!(empty.validate().is_err());

        let long = TaskCreateInput {
            name: "t".repeat(129),
            description: None,
            due_date: Utc::now().date_naive(),
            status: None,
            project_id: 1,
        };
        assert!(long.validate().is_err());
    }
}
