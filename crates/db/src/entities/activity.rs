//! Activity entity and the shared time-of-day slot enum.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One of six fixed clock-time partitions used to sanity-check a
/// scheduled time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "camelCase")]
pub enum TimeSlot {
    /// [06:00, 11:00)
    #[sea_orm(string_value = "morning")]
    Morning,
    /// [11:00, 13:00)
    #[sea_orm(string_value = "lunch")]
    Lunch,
    /// [13:00, 17:00)
    #[sea_orm(string_value = "afternoon")]
    Afternoon,
    /// [17:00, 19:00)
    #[sea_orm(string_value = "dinner")]
    Dinner,
    /// [19:00, 23:00)
    #[sea_orm(string_value = "evening")]
    Evening,
    /// [23:00, 06:00)
    #[sea_orm(string_value = "late_night")]
    LateNight,
}

/// Lifecycle status of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "camelCase")]
pub enum ActivityStatus {
    /// Proposed but not yet placed on the schedule.
    #[sea_orm(string_value = "idea")]
    Idea,
    /// Committed to a date (and possibly a day slot).
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
}

/// An activity within a trip - the scheduling target for activity-scoped
/// date polls.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub trip_id: String,

    pub title: String,

    pub status: ActivityStatus,

    #[sea_orm(nullable)]
    pub date: Option<Date>,

    #[sea_orm(nullable)]
    pub start_time: Option<Time>,

    #[sea_orm(nullable)]
    pub end_time: Option<Time>,

    /// 1..=10 slot number disambiguating same-day activities.
    #[sea_orm(nullable)]
    pub schedule_day_index: Option<i32>,

    #[sea_orm(nullable)]
    pub schedule_slot: Option<TimeSlot>,

    pub created_by: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(default_value = false)]
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trip::Entity",
        from = "Column::TripId",
        to = "super::trip::Column::Id",
        on_delete = "Cascade"
    )]
    Trip,
    #[sea_orm(has_many = "super::poll::Entity")]
    Poll,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
