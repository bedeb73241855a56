//! Creates the `tb_users` table holding account profiles and credentials.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TbUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TbUsers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TbUsers::Username).string_len(255).not_null())
                    .col(
                        ColumnDef::new(TbUsers::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TbUsers::PasswordHash).binary().not_null())
                    .col(
                        ColumnDef::new(TbUsers::DateRegistration)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TbUsers::DateLastOnline)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TbUsers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TbUsers {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    DateRegistration,
    DateLastOnline,
}
