use super::m20241001_000001_create_users_table::Users;
use super::m20241001_000002_create_issues_table::Issues;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Feedbacks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Feedbacks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Feedbacks::IssueId).integer().not_null())
                    .col(ColumnDef::new(Feedbacks::TenantId).string().not_null())
                    .col(
                        ColumnDef::new(Feedbacks::Comment)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Feedbacks::Rating).integer().not_null())
                    .col(
                        ColumnDef::new(Feedbacks::SubmittedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    // Feedback goes away with its issue
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedbacks_issue_id")
                            .from(Feedbacks::Table, Feedbacks::IssueId)
                            .to(Issues::Table, Issues::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    // ...but never with its tenant
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedbacks_tenant_id")
                            .from(Feedbacks::Table, Feedbacks::TenantId)
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
                    .name("idx_feedbacks_issue_id")
                    .table(Feedbacks::Table)
                    .col(Feedbacks::IssueId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_feedbacks_tenant_id")
                    .table(Feedbacks::Table)
                    .col(Feedbacks::TenantId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Feedbacks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Feedbacks {
    Table,
    Id,
    IssueId,
    TenantId,
    Comment,
    Rating,
    SubmittedOn,
}
