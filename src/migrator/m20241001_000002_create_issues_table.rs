use super::m20241001_000001_create_users_table::Users;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Issues::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Issues::Description).text().not_null())
                    .col(ColumnDef::new(Issues::Category).string().not_null())
                    .col(
                        ColumnDef::new(Issues::ReportedDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Issues::IsResolved).boolean().not_null())
                    .col(
                        ColumnDef::new(Issues::ApplicationUserId)
                            .string()
                            .not_null(),
                    )
                    // Users with issues cannot be deleted
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issues_application_user_id")
                            .from(Issues::Table, Issues::ApplicationUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_issues_application_user_id")
                    .table(Issues::Table)
                    .col(Issues::ApplicationUserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Issues::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Issues {
    Table,
    Id,
    Description,
    Category,
    ReportedDate,
    IsResolved,
    ApplicationUserId,
}
