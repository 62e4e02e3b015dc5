//! Dashboard of finalized budget items.
//!
//! Read-model types plus the rules for specialist edits after
//! finalization. Persistence lives in the db crate.

mod edit;
mod error;
mod summary;
pub mod types;

pub use edit::{
    EditableField, FieldEdit, FieldValue, ValidatedEdit, authorize_edit, can_edit, group_by_row,
    validate_row,
};
pub use error::DashboardError;
pub use summary::{channel_totals, monthly_totals, year_bounds};
pub use types::{ChannelSummary, DashboardFilter, DashboardRow, MonthlyTotal, RowOutcome};
