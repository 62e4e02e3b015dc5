//! Dashboard repository: finalized items and specialist edits.

use std::collections::HashMap;

use bap_core::auth::Actor;
use bap_core::dashboard::{
    ChannelSummary, DashboardError, DashboardFilter, DashboardRow, EditableField, FieldEdit,
    FieldValue, MonthlyTotal, RowOutcome, authorize_edit, can_edit, channel_totals, group_by_row,
    monthly_totals, validate_row, year_bounds,
};
use bap_core::import::Channel;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    budget_files, budget_items,
    sea_orm_active_enums::{BudgetStatus, MediaChannel},
    users,
};

fn db_error(e: DbErr) -> DashboardError {
    DashboardError::Database(e.to_string())
}

/// Dashboard repository.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Items of finalized files in a stable order.
    ///
    /// Ordered by finalization time, file, row number and item ID, so
    /// repeated reads of unchanged data are identical.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        actor: &Actor,
        filter: &DashboardFilter,
    ) -> Result<Vec<DashboardRow>, DashboardError> {
        let mut query = budget_items::Entity::find()
            .find_also_related(budget_files::Entity)
            .filter(budget_files::Column::Status.eq(BudgetStatus::Finalized));
        if let Some(channel) = filter.channel {
            query = query.filter(budget_items::Column::Channel.eq(MediaChannel::from(channel)));
        }

        let rows = query
            .order_by_asc(budget_files::Column::FinalizedAt)
            .order_by_asc(budget_files::Column::Id)
            .order_by_asc(budget_items::Column::RowNumber)
            .order_by_asc(budget_items::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        let mut uploader_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(_, file)| file.as_ref().map(|f| f.uploader_id))
            .collect();
        uploader_ids.sort_unstable();
        uploader_ids.dedup();

        let usernames: HashMap<Uuid, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(uploader_ids))
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|(item, file)| {
                let file = file?;
                let uploaded_by = usernames.get(&file.uploader_id).cloned().unwrap_or_default();
                Some(DashboardRow {
                    editable: can_edit(actor, &item.specialist),
                    id: item.id,
                    file_id: file.id,
                    filename: file.filename,
                    finalized_at: file.finalized_at.map(|t| t.to_utc()),
                    uploaded_by,
                    row_number: item.row_number,
                    budget_code: item.budget_code,
                    campaign_name: item.campaign_name,
                    vendor: item.vendor,
                    channel: item.channel.into(),
                    sub_channel: item.sub_channel,
                    amount_planned: item.amount_planned,
                    start_date: item.start_date,
                    end_date: item.end_date,
                    metric_1: item.metric_1,
                    metric_2: item.metric_2,
                    metric_3: item.metric_3,
                    specialist: item.specialist,
                    description: item.description,
                })
            })
            .collect())
    }

    /// Applies edits row by row.
    ///
    /// Each row is all-or-nothing in its own transaction; one rejected row
    /// does not affect the others. Outcomes follow the order rows first
    /// appear in `edits`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the database fails; rule violations are
    /// reported as rejected outcomes.
    pub async fn apply(
        &self,
        actor: &Actor,
        edits: Vec<FieldEdit>,
    ) -> Result<Vec<RowOutcome>, DashboardError> {
        let mut outcomes = Vec::new();
        for (row_id, row_edits) in group_by_row(edits) {
            let outcome = match self.apply_row(actor, row_id, &row_edits).await {
                Ok(fields) => RowOutcome::Accepted {
                    row_id,
                    fields: fields.iter().map(|f| f.as_str().to_string()).collect(),
                },
                Err(DashboardError::Database(e)) => return Err(DashboardError::Database(e)),
                Err(rejection) => {
                    tracing::debug!(
                        row_id = %row_id,
                        actor = %actor.username,
                        reason = %rejection,
                        "dashboard edit rejected"
                    );
                    RowOutcome::Rejected {
                        row_id,
                        error: rejection.error_code().to_string(),
                        message: rejection.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn apply_row(
        &self,
        actor: &Actor,
        row_id: Uuid,
        edits: &[FieldEdit],
    ) -> Result<Vec<EditableField>, DashboardError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let item = budget_items::Entity::find_by_id(row_id)
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(DashboardError::ItemNotFound(row_id))?;
        let file = budget_files::Entity::find_by_id(item.file_id)
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(DashboardError::ItemNotFound(row_id))?;

        authorize_edit(actor, row_id, &item.specialist, file.status.into())?;
        let validated = validate_row(edits)?;

        let mut active: budget_items::ActiveModel = item.into();
        let mut fields = Vec::with_capacity(validated.len());
        for edit in validated {
            set_field(&mut active, edit.field, edit.value)?;
            fields.push(edit.field);
        }
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await.map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        tracing::info!(row_id = %row_id, actor = %actor.username, fields = fields.len(), "dashboard row updated");
        Ok(fields)
    }

    /// Item count and total amount per channel over finalized files.
    ///
    /// Channels without finalized items are omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn summary_by_channel(&self) -> Result<Vec<ChannelSummary>, DashboardError> {
        let items = budget_items::Entity::find()
            .inner_join(budget_files::Entity)
            .filter(budget_files::Column::Status.eq(BudgetStatus::Finalized))
            .all(&self.db)
            .await
            .map_err(db_error)?;

        channel_totals(
            items
                .into_iter()
                .map(|i| (Channel::from(i.channel), i.amount_planned)),
        )
    }

    /// Finalized spend per month of `year`, by item start date.
    ///
    /// Items without a start date are left out; months without items are
    /// omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if `year` is out of range or the query fails.
    pub async fn monthly_trend(&self, year: i32) -> Result<Vec<MonthlyTotal>, DashboardError> {
        let (first, last) = year_bounds(year)?;
        let items = budget_items::Entity::find()
            .inner_join(budget_files::Entity)
            .filter(budget_files::Column::Status.eq(BudgetStatus::Finalized))
            .filter(budget_items::Column::StartDate.between(first, last))
            .all(&self.db)
            .await
            .map_err(db_error)?;

        monthly_totals(
            year,
            items
                .into_iter()
                .filter_map(|i| Some((i.start_date?, i.amount_planned))),
        )
    }
}

fn set_field(
    active: &mut budget_items::ActiveModel,
    field: EditableField,
    value: FieldValue,
) -> Result<(), DashboardError> {
    match (field, value) {
        (EditableField::CampaignName, FieldValue::Text(Some(text))) => {
            active.campaign_name = Set(text);
        }
        (EditableField::Vendor, FieldValue::Text(v)) => active.vendor = Set(v),
        (EditableField::SubChannel, FieldValue::Text(v)) => active.sub_channel = Set(v),
        (EditableField::Metric1, FieldValue::Text(v)) => active.metric_1 = Set(v),
        (EditableField::Metric2, FieldValue::Text(v)) => active.metric_2 = Set(v),
        (EditableField::Metric3, FieldValue::Text(v)) => active.metric_3 = Set(v),
        (EditableField::Description, FieldValue::Text(v)) => active.description = Set(v),
        (EditableField::AmountPlanned, FieldValue::Amount(amount)) => {
            active.amount_planned = Set(amount);
        }
        (EditableField::StartDate, FieldValue::Date(d)) => active.start_date = Set(d),
        (EditableField::EndDate, FieldValue::Date(d)) => active.end_date = Set(d),
        (field, _) => {
            return Err(DashboardError::invalid(field.as_str(), "value does not match field type"));
        }
    }
    Ok(())
}
