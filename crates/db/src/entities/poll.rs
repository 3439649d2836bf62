//! Poll entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of decision a poll makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "camelCase")]
pub enum PollType {
    /// Free-form choice between options.
    #[sea_orm(string_value = "ordinary")]
    Ordinary,
    /// Options are candidate date/time ranges, finalizable into a schedule.
    #[sea_orm(string_value = "date")]
    Date,
}

/// Lifecycle status of a poll.
///
/// Transitions are one-way: `Open -> Closed -> Finalized` or
/// `Open -> Finalized` directly. `Finalized` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "camelCase")]
pub enum PollStatus {
    /// Accepting votes and new options.
    #[sea_orm(string_value = "open")]
    Open,
    /// No new votes or options; still finalizable.
    #[sea_orm(string_value = "closed")]
    Closed,
    /// One option committed as the authoritative outcome. Terminal.
    #[sea_orm(string_value = "finalized")]
    Finalized,
}

/// A decision proposal with options, scoped to a trip or a specific
/// activity of that trip.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub trip_id: String,

    /// NULL = the poll decides trip-level dates; Some = it decides the
    /// schedule of this activity.
    #[sea_orm(nullable, indexed)]
    pub activity_id: Option<String>,

    pub poll_type: PollType,

    pub title: String,

    pub status: PollStatus,

    pub created_by: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_by: Option<String>,

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
    #[sea_orm(
        belongs_to = "super::activity::Entity",
        from = "Column::ActivityId",
        to = "super::activity::Column::Id",
        on_delete = "Cascade"
    )]
    Activity,
    #[sea_orm(has_many = "super::poll_option::Entity")]
    PollOption,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl Related<super::poll_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PollOption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
