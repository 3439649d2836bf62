//! Group member entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a group member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum GroupRole {
    /// Regular member - can propose, vote, and schedule.
    #[sea_orm(string_value = "member")]
    Member,
    /// Leader - additionally closes and finalizes polls for the group.
    #[sea_orm(string_value = "leader")]
    Leader,
}

impl Default for GroupRole {
    fn default() -> Self {
        Self::Member
    }
}

impl GroupRole {
    /// Check if this is the leader role.
    #[must_use]
    pub const fn is_leader(&self) -> bool {
        matches!(self, Self::Leader)
    }
}

/// Group member - tracks which users are in which groups.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The group they belong to.
    #[sea_orm(indexed)]
    pub group_id: String,

    /// The user who is a member.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Role of the member in the group.
    pub role: GroupRole,

    /// Inactive members keep their row but lose all capabilities.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    /// When the user joined the group.
    pub joined_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
