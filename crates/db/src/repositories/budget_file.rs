//! Budget file repository: creation from a normalized sheet and lookups.

use bap_core::import::{Channel, NormalizedItem, NormalizedSheet};
use bap_core::workflow::FileStatus;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{
    budget_files, budget_items,
    sea_orm_active_enums::{BudgetStatus, MediaChannel},
    users,
};

/// Items are inserted in batches of this many rows.
const INSERT_BATCH: usize = 200;

/// A budget file with its items in spreadsheet order.
#[derive(Debug, Clone, Serialize)]
pub struct FileWithItems {
    /// The file.
    pub file: budget_files::Model,
    /// Its items, ordered by row number.
    pub items: Vec<budget_items::Model>,
}

/// Count of files in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    /// Status.
    pub status: FileStatus,
    /// Number of files.
    pub count: u64,
}

/// Input for [`BudgetFileRepository::create_with_items`].
#[derive(Debug, Clone, Copy)]
pub struct NewBudgetFile<'a> {
    /// ID to create the file under.
    pub id: Uuid,
    /// Original upload name.
    pub filename: &'a str,
    /// Declared channel.
    pub channel: Channel,
    /// Uploading user.
    pub uploader_id: Uuid,
    /// Parsed spreadsheet.
    pub sheet: &'a NormalizedSheet,
    /// Stored copy of the uploaded spreadsheet.
    pub source_path: Option<&'a str>,
}

/// Budget file repository.
#[derive(Debug, Clone)]
pub struct BudgetFileRepository {
    db: DatabaseConnection,
}

impl BudgetFileRepository {
    /// Creates a new budget file repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores a new pending file and all of its items in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is stored in that case.
    pub async fn create_with_items(&self, input: NewBudgetFile<'_>) -> Result<FileWithItems, DbErr> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let file_id = input.id;
        let sheet = input.sheet;

        let txn = self.db.begin().await?;

        let file = budget_files::ActiveModel {
            id: Set(file_id),
            filename: Set(input.filename.to_string()),
            channel: Set(MediaChannel::from(input.channel)),
            status: Set(BudgetStatus::PendingApproval),
            uploader_id: Set(input.uploader_id),
            reviewer_id: Set(None),
            uploaded_at: Set(now),
            reviewed_at: Set(None),
            pdf_generated_at: Set(None),
            signed_uploaded_at: Set(None),
            finalized_at: Set(None),
            pdf_file_path: Set(None),
            signed_file_path: Set(None),
            reviewer_comment: Set(None),
            row_count: Set(i32::try_from(sheet.row_count).unwrap_or(i32::MAX)),
            total_amount: Set(sheet.total_amount),
            content_hash: Set(sheet.content_hash.clone()),
            sheet_name: Set(sheet.sheet_name.clone()),
            version: Set(0),
            source_file_path: Set(input.source_path.map(str::to_string)),
        }
        .insert(&txn)
        .await?;

        for batch in sheet.items.chunks(INSERT_BATCH) {
            let models = batch.iter().map(|item| new_item(file_id, item, now));
            budget_items::Entity::insert_many(models).exec(&txn).await?;
        }

        let items = load_items(&txn, file_id).await?;
        txn.commit().await?;

        tracing::info!(
            file_id = %file_id,
            uploader_id = %input.uploader_id,
            channel = %input.channel,
            rows = items.len(),
            "budget file created"
        );

        Ok(FileWithItems { file, items })
    }

    /// Finds a file by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<budget_files::Model>, DbErr> {
        budget_files::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a file together with its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_with_items(&self, id: Uuid) -> Result<Option<FileWithItems>, DbErr> {
        let Some(file) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let items = load_items(&self.db, id).await?;
        Ok(Some(FileWithItems { file, items }))
    }

    /// Items of a file ordered by row number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn items_for_file(&self, file_id: Uuid) -> Result<Vec<budget_items::Model>, DbErr> {
        load_items(&self.db, file_id).await
    }

    /// Finds a single item by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_item(&self, id: Uuid) -> Result<Option<budget_items::Model>, DbErr> {
        budget_items::Entity::find_by_id(id).one(&self.db).await
    }

    /// Files in `status`, newest upload first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_status(
        &self,
        status: FileStatus,
        limit: u64,
    ) -> Result<Vec<budget_files::Model>, DbErr> {
        budget_files::Entity::find()
            .filter(budget_files::Column::Status.eq(BudgetStatus::from(status)))
            .order_by_desc(budget_files::Column::UploadedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }

    /// Files uploaded by `uploader_id`, optionally narrowed to one status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_uploader(
        &self,
        uploader_id: Uuid,
        status: Option<FileStatus>,
        limit: u64,
    ) -> Result<Vec<budget_files::Model>, DbErr> {
        let mut query = budget_files::Entity::find()
            .filter(budget_files::Column::UploaderId.eq(uploader_id));
        if let Some(status) = status {
            query = query.filter(budget_files::Column::Status.eq(BudgetStatus::from(status)));
        }
        query
            .order_by_desc(budget_files::Column::UploadedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }

    /// All files, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_recent(&self, limit: u64) -> Result<Vec<budget_files::Model>, DbErr> {
        budget_files::Entity::find()
            .order_by_desc(budget_files::Column::UploadedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }

    /// Earliest file with the same content hash, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_content_hash(
        &self,
        content_hash: &str,
    ) -> Result<Option<budget_files::Model>, DbErr> {
        budget_files::Entity::find()
            .filter(budget_files::Column::ContentHash.eq(content_hash))
            .order_by_asc(budget_files::Column::UploadedAt)
            .one(&self.db)
            .await
    }

    /// Number of files per status, with every status present.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn status_counts(&self) -> Result<Vec<StatusCount>, DbErr> {
        let rows: Vec<(BudgetStatus, i64)> = budget_files::Entity::find()
            .select_only()
            .column(budget_files::Column::Status)
            .column_as(Expr::col(budget_files::Column::Id).count(), "count")
            .group_by(budget_files::Column::Status)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(FileStatus::ALL
            .into_iter()
            .map(|status| {
                let count = rows
                    .iter()
                    .find(|(s, _)| FileStatus::from(*s) == status)
                    .map_or(0, |(_, n)| u64::try_from(*n).unwrap_or(0));
                StatusCount { status, count }
            })
            .collect())
    }

    /// Username of a user, if the user exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn username_of(&self, user_id: Uuid) -> Result<Option<String>, DbErr> {
        username_of(&self.db, user_id).await
    }
}

pub(crate) async fn load_items<C: ConnectionTrait>(
    db: &C,
    file_id: Uuid,
) -> Result<Vec<budget_items::Model>, DbErr> {
    budget_items::Entity::find()
        .filter(budget_items::Column::FileId.eq(file_id))
        .order_by_asc(budget_items::Column::RowNumber)
        .order_by_asc(budget_items::Column::Id)
        .all(db)
        .await
}

pub(crate) async fn username_of<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<String>, DbErr> {
    Ok(users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .map(|u| u.username))
}

fn new_item(
    file_id: Uuid,
    item: &NormalizedItem,
    now: DateTimeWithTimeZone,
) -> budget_items::ActiveModel {
    budget_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        file_id: Set(file_id),
        row_number: Set(item.row_number),
        campaign_name: Set(item.campaign_name.clone()),
        budget_code: Set(item.budget_code.clone()),
        vendor: Set(item.vendor.clone()),
        channel: Set(MediaChannel::from(item.channel)),
        sub_channel: Set(item.sub_channel.clone()),
        amount_planned: Set(item.amount_planned),
        start_date: Set(item.start_date),
        end_date: Set(item.end_date),
        metric_1: Set(item.metric_1.clone()),
        metric_2: Set(item.metric_2.clone()),
        metric_3: Set(item.metric_3.clone()),
        specialist: Set(item.specialist.clone()),
        description: Set(item.description.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
}
