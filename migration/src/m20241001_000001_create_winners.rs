use sea_orm_migration::prelude::*;

/// Winners (每个州最多一名中奖者)
#[derive(DeriveIden)]
enum Winners {
    Table,
    Id,
    Email,
    State,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// `state` 上的 UNIQUE 约束保证 "一州一名" 不变量；
/// `id` 是外部用户标识，不自增。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Winners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Winners::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Winners::Email).text().not_null())
                    .col(
                        ColumnDef::new(Winners::State)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Winners::Table).if_exists().to_owned())
            .await
    }
}
