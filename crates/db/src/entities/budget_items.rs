//! `SeaORM` Entity for budget_items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MediaChannel;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub file_id: Uuid,
    pub row_number: i32,
    #[sea_orm(column_type = "Text")]
    pub campaign_name: String,
    pub budget_code: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub vendor: Option<String>,
    pub channel: MediaChannel,
    #[sea_orm(column_type = "Text", nullable)]
    pub sub_channel: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub amount_planned: Decimal,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub metric_1: Option<String>,
    pub metric_2: Option<String>,
    pub metric_3: Option<String>,
    pub specialist: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_files::Entity",
        from = "Column::FileId",
        to = "super::budget_files::Column::Id",
        on_delete = "Cascade"
    )]
    BudgetFiles,
}

impl Related<super::budget_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetFiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
