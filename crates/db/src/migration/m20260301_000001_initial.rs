//! Initial schema: users, budget files and budget items.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // USERS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::FullName).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::LastLoginAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // BUDGET FILES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(BudgetFiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BudgetFiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BudgetFiles::Filename).string_len(255).not_null())
                    .col(ColumnDef::new(BudgetFiles::Channel).string_len(16).not_null())
                    .col(ColumnDef::new(BudgetFiles::Status).string_len(24).not_null())
                    .col(ColumnDef::new(BudgetFiles::UploaderId).uuid().not_null())
                    .col(ColumnDef::new(BudgetFiles::ReviewerId).uuid())
                    .col(
                        ColumnDef::new(BudgetFiles::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BudgetFiles::ReviewedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(BudgetFiles::PdfGeneratedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(BudgetFiles::SignedUploadedAt).timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(BudgetFiles::FinalizedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(BudgetFiles::PdfFilePath).string_len(512))
                    .col(ColumnDef::new(BudgetFiles::SignedFilePath).string_len(512))
                    .col(ColumnDef::new(BudgetFiles::ReviewerComment).text())
                    .col(
                        ColumnDef::new(BudgetFiles::RowCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(&mut amount_column(manager, BudgetFiles::TotalAmount))
                    .col(ColumnDef::new(BudgetFiles::ContentHash).string_len(64).not_null())
                    .col(ColumnDef::new(BudgetFiles::SheetName).string_len(255))
                    .col(
                        ColumnDef::new(BudgetFiles::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_files_uploader")
                            .from(BudgetFiles::Table, BudgetFiles::UploaderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_budget_files_status")
                    .table(BudgetFiles::Table)
                    .col(BudgetFiles::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_budget_files_content_hash")
                    .table(BudgetFiles::Table)
                    .col(BudgetFiles::ContentHash)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_budget_files_uploader")
                    .table(BudgetFiles::Table)
                    .col(BudgetFiles::UploaderId)
                    .col(BudgetFiles::UploadedAt)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // BUDGET ITEMS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(BudgetItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BudgetItems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BudgetItems::FileId).uuid().not_null())
                    .col(ColumnDef::new(BudgetItems::RowNumber).integer().not_null())
                    .col(ColumnDef::new(BudgetItems::CampaignName).text().not_null())
                    .col(ColumnDef::new(BudgetItems::BudgetCode).string_len(128).not_null())
                    .col(ColumnDef::new(BudgetItems::Vendor).text())
                    .col(ColumnDef::new(BudgetItems::Channel).string_len(16).not_null())
                    .col(ColumnDef::new(BudgetItems::SubChannel).text())
                    .col(&mut amount_column(manager, BudgetItems::AmountPlanned))
                    .col(ColumnDef::new(BudgetItems::StartDate).date())
                    .col(ColumnDef::new(BudgetItems::EndDate).date())
                    .col(ColumnDef::new(BudgetItems::Metric1).string_len(255))
                    .col(ColumnDef::new(BudgetItems::Metric2).string_len(255))
                    .col(ColumnDef::new(BudgetItems::Metric3).string_len(255))
                    .col(ColumnDef::new(BudgetItems::Specialist).string_len(64).not_null())
                    .col(ColumnDef::new(BudgetItems::Description).text())
                    .col(
                        ColumnDef::new(BudgetItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_items_file")
                            .from(BudgetItems::Table, BudgetItems::FileId)
                            .to(BudgetFiles::Table, BudgetFiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_budget_items_file_row")
                    .table(BudgetItems::Table)
                    .col(BudgetItems::FileId)
                    .col(BudgetItems::RowNumber)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_budget_items_specialist")
                    .table(BudgetItems::Table)
                    .col(BudgetItems::Specialist)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BudgetItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

/// NUMERIC(18,2) on PostgreSQL. SQLite reads decimals back through `f64`,
/// so the column needs REAL affinity there or integral amounts fail to decode.
fn amount_column(manager: &SchemaManager, name: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(name);
    match manager.get_database_backend() {
        sea_orm::DbBackend::Sqlite => def.double(),
        _ => def.decimal_len(18, 2),
    };
    def.not_null().to_owned()
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    FullName,
    Role,
    PasswordHash,
    IsActive,
    CreatedAt,
    LastLoginAt,
}

#[derive(DeriveIden)]
enum BudgetFiles {
    Table,
    Id,
    Filename,
    Channel,
    Status,
    UploaderId,
    ReviewerId,
    UploadedAt,
    ReviewedAt,
    PdfGeneratedAt,
    SignedUploadedAt,
    FinalizedAt,
    PdfFilePath,
    SignedFilePath,
    ReviewerComment,
    RowCount,
    TotalAmount,
    ContentHash,
    SheetName,
    Version,
}

#[derive(DeriveIden)]
enum BudgetItems {
    Table,
    Id,
    FileId,
    RowNumber,
    CampaignName,
    BudgetCode,
    Vendor,
    Channel,
    SubChannel,
    AmountPlanned,
    StartDate,
    EndDate,
    #[sea_orm(iden = "metric_1")]
    Metric1,
    #[sea_orm(iden = "metric_2")]
    Metric2,
    #[sea_orm(iden = "metric_3")]
    Metric3,
    Specialist,
    Description,
    CreatedAt,
    UpdatedAt,
}
