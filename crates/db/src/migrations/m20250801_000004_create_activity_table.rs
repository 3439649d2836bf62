//! Create activity table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Activity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Activity::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Activity::TripId).string_len(32).not_null())
                    .col(ColumnDef::new(Activity::Title).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Activity::Status)
                            .string_len(20)
                            .not_null()
                            .default("idea"),
                    )
                    .col(ColumnDef::new(Activity::Date).date())
                    .col(ColumnDef::new(Activity::StartTime).time())
                    .col(ColumnDef::new(Activity::EndTime).time())
                    .col(ColumnDef::new(Activity::ScheduleDayIndex).integer())
                    .col(ColumnDef::new(Activity::ScheduleSlot).string_len(20))
                    .col(
                        ColumnDef::new(Activity::CreatedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Activity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Activity::UpdatedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Activity::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_trip")
                            .from(Activity::Table, Activity::TripId)
                            .to(Trip::Table, Trip::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_trip_date")
                    .table(Activity::Table)
                    .col(Activity::TripId)
                    .col(Activity::Date)
                    .to_owned(),
            )
            .await?;

        // Two concurrent writers racing for the same day slot: the loser
        // hits this index instead of creating a duplicate.
        manager
            .create_index(
                Index::create()
                    .name("idx_activity_day_slot_unique")
                    .table(Activity::Table)
                    .col(Activity::TripId)
                    .col(Activity::Date)
                    .col(Activity::ScheduleDayIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Activity::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Activity {
    Table,
    Id,
    TripId,
    Title,
    Status,
    Date,
    StartTime,
    EndTime,
    ScheduleDayIndex,
    ScheduleSlot,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
    IsDeleted,
}

#[derive(Iden)]
enum Trip {
    Table,
    Id,
}
