//! Aggregates over finalized items.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::error::DashboardError;
use super::types::{ChannelSummary, MonthlyTotal};
use crate::import::Channel;

/// Item count and total per channel, in [`Channel::ALL`] order.
///
/// Channels without items are omitted.
///
/// # Errors
///
/// Returns [`DashboardError::TotalOutOfRange`] if a channel total overflows.
pub fn channel_totals(
    items: impl IntoIterator<Item = (Channel, Decimal)>,
) -> Result<Vec<ChannelSummary>, DashboardError> {
    let mut totals: Vec<ChannelSummary> = Vec::new();
    for (channel, amount) in items {
        let entry = match totals.iter_mut().position(|s| s.channel == channel) {
            Some(i) => &mut totals[i],
            None => {
                totals.push(ChannelSummary {
                    channel,
                    item_count: 0,
                    total_amount: Decimal::ZERO,
                });
                let last = totals.len() - 1;
                &mut totals[last]
            }
        };
        entry.item_count += 1;
        entry.total_amount = entry
            .total_amount
            .checked_add(amount)
            .ok_or_else(|| DashboardError::TotalOutOfRange(channel.to_string()))?;
    }

    totals.sort_by_key(|s| Channel::ALL.iter().position(|c| *c == s.channel));
    Ok(totals)
}

/// First and last day of `year`.
///
/// # Errors
///
/// Returns [`DashboardError::InvalidValue`] for a year chrono cannot represent.
pub fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), DashboardError> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .zip(NaiveDate::from_ymd_opt(year, 12, 31))
        .ok_or_else(|| DashboardError::invalid("year", format!("{year} is out of range")))
}

/// Per-month totals of `year`, keyed by each item's start date.
///
/// Items dated outside `year` are ignored; months without items are omitted.
///
/// # Errors
///
/// Returns [`DashboardError::TotalOutOfRange`] if a month total overflows.
pub fn monthly_totals(
    year: i32,
    items: impl IntoIterator<Item = (NaiveDate, Decimal)>,
) -> Result<Vec<MonthlyTotal>, DashboardError> {
    let mut months: BTreeMap<u32, (u64, Decimal)> = BTreeMap::new();
    for (date, amount) in items.into_iter().filter(|(d, _)| d.year() == year) {
        let (count, total) = months.entry(date.month()).or_insert((0, Decimal::ZERO));
        *count += 1;
        *total = total
            .checked_add(amount)
            .ok_or_else(|| DashboardError::TotalOutOfRange(format!("{year}-{:02}", date.month())))?;
    }

    Ok(months
        .into_iter()
        .map(|(month, (item_count, total_amount))| MonthlyTotal {
            year,
            month,
            item_count,
            total_amount,
        })
        .collect())
}
