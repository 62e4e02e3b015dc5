//! Edit rules for finalized budget items.
//!
//! Only the item's specialist may edit it, only after the parent file is
//! finalized, and only the fields in [`EditableField`]. Values arrive as
//! JSON and are coerced with the same rules the importer uses.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::error::DashboardError;
use crate::auth::Actor;
use crate::import::coerce::{amount_in_range, parse_amount, parse_date};
use crate::workflow::FileStatus;

/// Item columns that stay fixed after import.
const IMMUTABLE_FIELDS: &[&str] = &["id", "budget_code", "file_id", "specialist", "channel", "row_number"];

/// Item fields a specialist may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableField {
    /// Campaign name; may not be blank.
    CampaignName,
    /// Vendor.
    Vendor,
    /// Sub-channel.
    SubChannel,
    /// Planned amount; may not be blank.
    AmountPlanned,
    /// Start date.
    StartDate,
    /// End date.
    EndDate,
    /// Metric 1.
    Metric1,
    /// Metric 2.
    Metric2,
    /// Metric 3.
    Metric3,
    /// Description.
    Description,
}

impl EditableField {
    /// Every editable field.
    pub const ALL: [Self; 10] = [
        Self::CampaignName,
        Self::Vendor,
        Self::SubChannel,
        Self::AmountPlanned,
        Self::StartDate,
        Self::EndDate,
        Self::Metric1,
        Self::Metric2,
        Self::Metric3,
        Self::Description,
    ];

    /// Column name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CampaignName => "campaign_name",
            Self::Vendor => "vendor",
            Self::SubChannel => "sub_channel",
            Self::AmountPlanned => "amount_planned",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::Metric1 => "metric_1",
            Self::Metric2 => "metric_2",
            Self::Metric3 => "metric_3",
            Self::Description => "description",
        }
    }

    /// Parse a column name; immutable and unknown names are invalid.
    pub fn parse(name: &str) -> Result<Self, DashboardError> {
        let key = name.trim();
        if let Some(field) = Self::ALL.into_iter().find(|f| f.as_str() == key) {
            return Ok(field);
        }
        if IMMUTABLE_FIELDS.contains(&key) {
            Err(DashboardError::invalid(key, "field cannot be edited"))
        } else {
            Err(DashboardError::invalid(key, "unknown field"))
        }
    }

    /// Coerce a JSON value into this field's type.
    pub fn coerce(self, value: &Value) -> Result<FieldValue, DashboardError> {
        match self {
            Self::AmountPlanned => match amount_value(value) {
                Some(amount) if amount_in_range(amount) => Ok(FieldValue::Amount(amount)),
                Some(_) => Err(DashboardError::invalid(self.as_str(), "amount out of range")),
                None => Err(DashboardError::invalid(self.as_str(), "expected an amount")),
            },
            Self::StartDate | Self::EndDate => date_value(value)
                .map(FieldValue::Date)
                .ok_or_else(|| DashboardError::invalid(self.as_str(), "expected a date")),
            Self::CampaignName => match text_value(value) {
                Some(Some(text)) => Ok(FieldValue::Text(Some(text))),
                Some(None) => Err(DashboardError::invalid(self.as_str(), "may not be empty")),
                None => Err(DashboardError::invalid(self.as_str(), "expected text")),
            },
            _ => text_value(value)
                .map(FieldValue::Text)
                .ok_or_else(|| DashboardError::invalid(self.as_str(), "expected text")),
        }
    }
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coerced field value ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text; `None` clears the column.
    Text(Option<String>),
    /// Decimal amount.
    Amount(Decimal),
    /// Date; `None` clears the column.
    Date(Option<NaiveDate>),
}

/// One requested cell change.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldEdit {
    /// Item ID.
    pub row_id: Uuid,
    /// Column name.
    pub field: String,
    /// New value.
    pub value: Value,
}

/// A change that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEdit {
    /// Field to write.
    pub field: EditableField,
    /// Value to write.
    pub value: FieldValue,
}

/// Whether `actor` owns rows assigned to `specialist`.
#[must_use]
pub fn can_edit(actor: &Actor, specialist: &str) -> bool {
    actor.username == specialist
}

/// Check the actor may edit a row of a file in `status`.
pub fn authorize_edit(
    actor: &Actor,
    row_id: Uuid,
    specialist: &str,
    status: FileStatus,
) -> Result<(), DashboardError> {
    if status != FileStatus::Finalized {
        return Err(DashboardError::NotFinalized { row_id });
    }
    if !can_edit(actor, specialist) {
        return Err(DashboardError::UnauthorizedEdit {
            row_id,
            specialist: specialist.to_string(),
        });
    }
    Ok(())
}

/// Validate every edit for one row; any failure rejects them all.
///
/// A later edit of the same field replaces an earlier one.
pub fn validate_row(edits: &[FieldEdit]) -> Result<Vec<ValidatedEdit>, DashboardError> {
    let mut out: Vec<ValidatedEdit> = Vec::with_capacity(edits.len());
    for edit in edits {
        let field = EditableField::parse(&edit.field)?;
        let value = field.coerce(&edit.value)?;
        match out.iter_mut().find(|e| e.field == field) {
            Some(existing) => existing.value = value,
            None => out.push(ValidatedEdit { field, value }),
        }
    }
    Ok(out)
}

/// Group edits by row, keeping the order rows were first mentioned.
#[must_use]
pub fn group_by_row(edits: Vec<FieldEdit>) -> Vec<(Uuid, Vec<FieldEdit>)> {
    let mut groups: Vec<(Uuid, Vec<FieldEdit>)> = Vec::new();
    for edit in edits {
        match groups.iter_mut().find(|(id, _)| *id == edit.row_id) {
            Some((_, list)) => list.push(edit),
            None => groups.push((edit.row_id, vec![edit])),
        }
    }
    groups
}

/// `Some(None)` for null or blank, `Some(Some(_))` for text or a number.
fn text_value(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => {
            let trimmed = s.trim();
            Some((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Value::Number(n) => Some(Some(n.to_string())),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

fn amount_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

fn date_value(value: &Value) -> Option<Option<NaiveDate>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) if s.trim().is_empty() => Some(None),
        Value::String(s) => parse_date(s).map(Some),
        _ => None,
    }
}
