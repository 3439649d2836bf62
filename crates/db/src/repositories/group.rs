//! Group repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use tripcrew_common::{AppError, AppResult};

use crate::entities::group_member::GroupRole;
use crate::entities::{Group, GroupMember, group, group_member};

/// Repository for group and membership operations.
#[derive(Clone)]
pub struct GroupRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupRepository {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Group Operations ====================

    /// Find group by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<group::Model>> {
        Group::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get group by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<group::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group not found: {id}")))
    }

    /// Create a new group.
    pub async fn create(&self, model: group::ActiveModel) -> AppResult<group::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Member Operations ====================

    /// Get a user's membership row in a group.
    pub async fn get_member(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> AppResult<Option<group_member::Model>> {
        GroupMember::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .filter(group_member::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is an active member of a group.
    pub async fn is_active_member(&self, group_id: &str, user_id: &str) -> AppResult<bool> {
        let count = GroupMember::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .filter(group_member::Column::UserId.eq(user_id))
            .filter(group_member::Column::IsActive.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Check if a user is an active leader of a group.
    pub async fn is_leader(&self, group_id: &str, user_id: &str) -> AppResult<bool> {
        let count = GroupMember::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .filter(group_member::Column::UserId.eq(user_id))
            .filter(group_member::Column::IsActive.eq(true))
            .filter(group_member::Column::Role.eq(GroupRole::Leader))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Add a member to a group.
    pub async fn add_member(
        &self,
        model: group_member::ActiveModel,
    ) -> AppResult<group_member::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List members of a group.
    pub async fn list_members(
        &self,
        group_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group_member::Model>> {
        use sea_orm::QuerySelect;
        GroupMember::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .order_by(group_member::Column::JoinedAt, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_member(group_id: &str, user_id: &str, role: GroupRole) -> group_member::Model {
        group_member::Model {
            id: format!("gm_{user_id}"),
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
            role,
            is_active: true,
            joined_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_member() {
        let member = test_member("g1", "u1", GroupRole::Member);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[member.clone()]])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        let found = repo.get_member("g1", "u1").await.unwrap();
        assert_eq!(found.unwrap().role, GroupRole::Member);
    }

    #[tokio::test]
    async fn test_find_by_id_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group::Model>::new()])
                .into_connection(),
        );

        let repo = GroupRepository::new(db);
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }
}
