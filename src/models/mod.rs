pub mod account;
pub mod project;
pub mod revoked_token;
pub mod task;

pub use account::{Account, AccountResponse, UpdateAccountRequest};
pub use project::{Project, ProjectInput};
pub use revoked_token::{RevokedToken, TokenType};
pub use task::{Task, TaskCreateInput, TaskStatus, TaskUpdateInput};
