//! Dashboard read-model types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::import::Channel;

/// Optional narrowing of the dashboard listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardFilter {
    /// Only items of this channel.
    pub channel: Option<Channel>,
}

/// One finalized budget item as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardRow {
    /// Item ID.
    pub id: Uuid,
    /// Parent file ID.
    pub file_id: Uuid,
    /// Parent file name.
    pub filename: String,
    /// When the parent was finalized.
    pub finalized_at: Option<DateTime<Utc>>,
    /// Uploader username.
    pub uploaded_by: String,
    /// Spreadsheet row.
    pub row_number: i32,
    /// Budget code.
    pub budget_code: String,
    /// Campaign name.
    pub campaign_name: String,
    /// Vendor.
    pub vendor: Option<String>,
    /// Channel.
    pub channel: Channel,
    /// Sub-channel.
    pub sub_channel: Option<String>,
    /// Planned amount.
    pub amount_planned: Decimal,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// End date.
    pub end_date: Option<NaiveDate>,
    /// Metric 1.
    pub metric_1: Option<String>,
    /// Metric 2.
    pub metric_2: Option<String>,
    /// Metric 3.
    pub metric_3: Option<String>,
    /// Responsible specialist.
    pub specialist: String,
    /// Description.
    pub description: Option<String>,
    /// Display hint only; edits are re-authorized on write.
    pub editable: bool,
}

/// Item count and total per channel over finalized files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSummary {
    /// Channel.
    pub channel: Channel,
    /// Number of items.
    pub item_count: u64,
    /// Sum of planned amounts.
    pub total_amount: Decimal,
}

/// Finalized spend of one month, keyed by item start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    /// Calendar year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
    /// Number of items.
    pub item_count: u64,
    /// Sum of planned amounts.
    pub total_amount: Decimal,
}

/// Result of applying the edits for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RowOutcome {
    /// All fields for the row were written.
    Accepted {
        /// Edited row.
        row_id: Uuid,
        /// Fields written.
        fields: Vec<String>,
    },
    /// Nothing was written for the row.
    Rejected {
        /// Edited row.
        row_id: Uuid,
        /// Machine-readable reason.
        error: String,
        /// Human-readable reason.
        message: String,
    },
}

impl RowOutcome {
    /// Row the outcome refers to.
    #[must_use]
    pub const fn row_id(&self) -> Uuid {
        match self {
            Self::Accepted { row_id, .. } | Self::Rejected { row_id, .. } => *row_id,
        }
    }

    /// True if the row was written.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}
