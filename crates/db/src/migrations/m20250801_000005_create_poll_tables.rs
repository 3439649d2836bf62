//! Create poll and `poll_option` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Poll::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Poll::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Poll::TripId).string_len(32).not_null())
                    .col(ColumnDef::new(Poll::ActivityId).string_len(32))
                    .col(ColumnDef::new(Poll::PollType).string_len(20).not_null())
                    .col(ColumnDef::new(Poll::Title).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Poll::Status)
                            .string_len(20)
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(Poll::CreatedBy).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Poll::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Poll::UpdatedBy).string_len(32))
                    .col(ColumnDef::new(Poll::UpdatedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Poll::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_trip")
                            .from(Poll::Table, Poll::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_activity")
                            .from(Poll::Table, Poll::ActivityId)
                            .to(Activity::Table, Activity::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_poll_trip_id")
                    .table(Poll::Table)
                    .col(Poll::TripId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PollOption::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PollOption::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PollOption::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(PollOption::Text).text())
                    .col(ColumnDef::new(PollOption::MediaUrl).string_len(512))
                    .col(ColumnDef::new(PollOption::Metadata).json_binary())
                    .col(ColumnDef::new(PollOption::DateStart).timestamp_with_time_zone())
                    .col(ColumnDef::new(PollOption::DateEnd).timestamp_with_time_zone())
                    .col(ColumnDef::new(PollOption::TimeOfDay).string_len(20))
                    .col(
                        ColumnDef::new(PollOption::CreatedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PollOption::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_option_poll")
                            .from(PollOption::Table, PollOption::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_poll_option_poll_id")
                    .table(PollOption::Table)
                    .col(PollOption::PollId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PollOption::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Poll::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
    TripId,
    ActivityId,
    PollType,
    Title,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedBy,
    UpdatedAt,
    IsDeleted,
}

#[derive(Iden)]
enum PollOption {
    Table,
    Id,
    PollId,
    Text,
    MediaUrl,
    Metadata,
    DateStart,
    DateEnd,
    TimeOfDay,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Trip {
    Table,
    Id,
}

#[derive(Iden)]
enum Activity {
    Table,
    Id,
}
