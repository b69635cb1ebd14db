use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const UNIQUE_KEY_INDEX: &str = "idx_usage_windows_identity_window";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsageWindows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsageWindows::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsageWindows::Identity).text().not_null())
                    .col(
                        ColumnDef::new(UsageWindows::WindowStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsageWindows::Count)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .check(Expr::col(UsageWindows::Count).gte(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(UNIQUE_KEY_INDEX)
                    .table(UsageWindows::Table)
                    .col(UsageWindows::Identity)
                    .col(UsageWindows::WindowStart)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsageWindows::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UsageWindows {
    Table,
    Id,
    Identity,
    WindowStart,
    Count,
}
