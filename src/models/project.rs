use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A project entity. Ownership (`account_id`) is fixed at creation and never
/// changes; deleting a project removes its tasks as well.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub account_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or updating a project.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProjectInput {
    #[validate(length(min = 1, max = 128, message = "must be between 1 and 128 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_input_validation() {
        let valid = ProjectInput {
            name: "Website Redesign".to_string(),
            description: Some("Q3 marketing site refresh".to_string()),
        };
        assert!(valid.validate().is_ok());

        let empty_name = ProjectInput {
            name: "".to_string(),
            description: None,
        };
        assert!(empty_name.validate().is_err());

        let long_name = ProjectInput {
            name: "a".repeat(129),
            description: None,
        };
        assert!(long_name.validate().is_err());

        let long_description = ProjectInput {
            name: "ok".to_string(),
            description: Some("d".repeat(2001)),
        };
        assert!(long_description.validate().is_err());
    }
}
