//! Poll option entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::activity::TimeSlot;

/// A single option inside a poll.
///
/// At least one of `text`, `media_url`, `metadata`, `date_start` must be
/// present. Date polls additionally require `date_start`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll_option")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub poll_id: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub text: Option<String>,

    #[sea_orm(nullable)]
    pub media_url: Option<String>,

    /// Opaque client metadata. Validated as JSON, never interpreted.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metadata: Option<JsonValue>,

    /// Candidate start. Mandatory for date-poll options.
    #[sea_orm(nullable)]
    pub date_start: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub date_end: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub time_of_day: Option<TimeSlot>,

    pub created_by: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,
    #[sea_orm(has_many = "super::vote::Entity")]
    Vote,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
