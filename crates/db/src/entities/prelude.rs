//! Entity re-exports.

pub use super::budget_files::Entity as BudgetFiles;
pub use super::budget_items::Entity as BudgetItems;
pub use super::users::Entity as Users;
