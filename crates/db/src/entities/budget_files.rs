//! `SeaORM` Entity for budget_files table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{BudgetStatus, MediaChannel};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub filename: String,
    pub channel: MediaChannel,
    pub status: BudgetStatus,
    pub uploader_id: Uuid,
    pub reviewer_id: Option<Uuid>,
    pub uploaded_at: DateTimeWithTimeZone,
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    pub pdf_generated_at: Option<DateTimeWithTimeZone>,
    pub signed_uploaded_at: Option<DateTimeWithTimeZone>,
    pub finalized_at: Option<DateTimeWithTimeZone>,
    pub pdf_file_path: Option<String>,
    pub signed_file_path: Option<String>,
    pub reviewer_comment: Option<String>,
    pub row_count: i32,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub total_amount: Decimal,
    pub content_hash: String,
    pub sheet_name: Option<String>,
    pub version: i32,
    pub source_file_path: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UploaderId",
        to = "super::users::Column::Id"
    )]
    Uploader,
    #[sea_orm(has_many = "super::budget_items::Entity")]
    BudgetItems,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploader.def()
    }
}

impl Related<super::budget_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
