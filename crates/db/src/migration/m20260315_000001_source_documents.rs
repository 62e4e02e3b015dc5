//! Keep the uploaded spreadsheet next to its parsed rows.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(BudgetFiles::Table)
                    .add_column(ColumnDef::new(BudgetFiles::SourceFilePath).string_len(512))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(BudgetFiles::Table)
                    .drop_column(BudgetFiles::SourceFilePath)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum BudgetFiles {
    Table,
    SourceFilePath,
}
