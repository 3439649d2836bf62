//! Trip entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A trip being planned by a group.
///
/// `planning_range_start..=planning_range_end` is the envelope in which the
/// group collects proposals. The confirmed range (`start_date`/`end_date`)
/// is written by finalizing a trip-scoped date poll and is kept strictly
/// inside the planning envelope.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trip")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub group_id: String,

    pub title: String,

    pub planning_range_start: Date,

    pub planning_range_end: Date,

    /// Confirmed start date, set by finalization.
    #[sea_orm(nullable)]
    pub start_date: Option<Date>,

    /// Confirmed end date, set by finalization.
    #[sea_orm(nullable)]
    pub end_date: Option<Date>,

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
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,
    #[sea_orm(has_many = "super::activity::Entity")]
    Activity,
    #[sea_orm(has_many = "super::poll::Entity")]
    Poll,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
