//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod budget_file;
pub mod dashboard;
pub mod user;
pub mod workflow;

pub use budget_file::{BudgetFileRepository, FileWithItems, NewBudgetFile, StatusCount};
pub use dashboard::DashboardRepository;
pub use user::UserRepository;
pub use workflow::{StoredDocument, WorkflowRepository};
