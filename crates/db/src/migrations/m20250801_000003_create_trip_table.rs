//! Create trip table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trip::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Trip::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Trip::GroupId).string_len(32).not_null())
                    .col(ColumnDef::new(Trip::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Trip::PlanningRangeStart).date().not_null())
                    .col(ColumnDef::new(Trip::PlanningRangeEnd).date().not_null())
                    .col(ColumnDef::new(Trip::StartDate).date())
                    .col(ColumnDef::new(Trip::EndDate).date())
                    .col(ColumnDef::new(Trip::CreatedBy).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Trip::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Trip::UpdatedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Trip::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_group")
                            .from(Trip::Table, Trip::GroupId)
                            .to(Group::Table, Group::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trip_group_id")
                    .table(Trip::Table)
                    .col(Trip::GroupId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trip::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Trip {
    Table,
    Id,
    GroupId,
    Title,
    PlanningRangeStart,
    PlanningRangeEnd,
    StartDate,
    EndDate,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
    IsDeleted,
}

#[derive(Iden)]
enum Group {
    Table,
    Id,
}
