//! Vote repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    SqlErr, TransactionTrait,
};
use tripcrew_common::{AppError, AppResult};

use crate::entities::{Vote, vote};

/// Repository for the vote ledger.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a vote by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<vote::Model>> {
        Vote::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a vote by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<vote::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vote not found: {id}")))
    }

    /// All votes cast in a poll.
    pub async fn find_by_poll(&self, poll_id: &str) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's votes within a poll.
    pub async fn find_by_user_and_poll(
        &self,
        user_id: &str,
        poll_id: &str,
    ) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::PollId.eq(poll_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user already voted for a specific option.
    pub async fn has_vote_for_option(&self, user_id: &str, option_id: &str) -> AppResult<bool> {
        use sea_orm::PaginatorTrait;
        let count = Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::PollOptionId.eq(option_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Insert a vote. A unique-index violation (racing duplicate cast)
    /// surfaces as a Conflict.
    pub async fn create(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Vote already exists for this option".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Delete a vote.
    pub async fn delete(&self, model: vote::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Atomically replace a user's existing votes in a poll with one new
    /// vote. Used by change-vote on ordinary polls.
    pub async fn replace_for_poll(
        &self,
        user_id: &str,
        poll_id: &str,
        new_vote: vote::ActiveModel,
    ) -> AppResult<vote::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Vote::delete_many()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::PollId.eq(poll_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = new_vote.insert(&txn).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Vote already exists for this option".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_vote(id: &str, option_id: &str, user_id: &str) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            poll_id: "p1".to_string(),
            poll_option_id: option_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_and_poll() {
        let v1 = test_vote("v1", "o1", "u1");
        let v2 = test_vote("v2", "o2", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[v1, v2]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let votes = repo.find_by_user_and_poll("u1", "p1").await.unwrap();
        assert_eq!(votes.len(), 2);
    }
}
