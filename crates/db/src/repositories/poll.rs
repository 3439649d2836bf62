//! Poll repository.
//!
//! Besides plain CRUD this owns the transactional commit paths: a poll is
//! created together with its options, and finalization persists the poll's
//! terminal status and the mutated activity/trip in one transaction.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use tripcrew_common::{AppError, AppResult};

use crate::entities::{Poll, PollOption, activity, poll, poll_option, trip};

/// Which polls of a trip to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollScope {
    /// Every poll of the trip.
    All,
    /// Only trip-level polls (no activity binding).
    TripLevel,
    /// Only polls bound to the given activity.
    Activity(String),
}

/// Repository for poll and poll-option operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Poll Operations ====================

    /// Find a poll by ID (excluding soft-deleted rows).
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .filter(poll::Column::IsDeleted.eq(false))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a poll by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<poll::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Poll not found: {id}")))
    }

    /// List polls of a trip, newest first.
    pub async fn list_by_trip(
        &self,
        trip_id: &str,
        scope: &PollScope,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<poll::Model>> {
        let mut query = Poll::find()
            .filter(poll::Column::TripId.eq(trip_id))
            .filter(poll::Column::IsDeleted.eq(false));

        match scope {
            PollScope::All => {}
            PollScope::TripLevel => {
                query = query.filter(poll::Column::ActivityId.is_null());
            }
            PollScope::Activity(activity_id) => {
                query = query.filter(poll::Column::ActivityId.eq(activity_id.as_str()));
            }
        }

        query
            .order_by(poll::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a poll together with its initial options in one transaction.
    pub async fn create_with_options(
        &self,
        poll: poll::ActiveModel,
        options: Vec<poll_option::ActiveModel>,
    ) -> AppResult<poll::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = poll
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for option in options {
            option
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(created)
    }

    /// Update a poll.
    pub async fn update(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Option Operations ====================

    /// Find a poll option by ID.
    pub async fn find_option_by_id(&self, id: &str) -> AppResult<Option<poll_option::Model>> {
        PollOption::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a poll option by ID, returning error if not found.
    pub async fn get_option_by_id(&self, id: &str) -> AppResult<poll_option::Model> {
        self.find_option_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Poll option not found: {id}")))
    }

    /// List options of a poll in creation order.
    pub async fn list_options(&self, poll_id: &str) -> AppResult<Vec<poll_option::Model>> {
        PollOption::find()
            .filter(poll_option::Column::PollId.eq(poll_id))
            .order_by(poll_option::Column::CreatedAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add an option to a poll.
    pub async fn create_option(
        &self,
        model: poll_option::ActiveModel,
    ) -> AppResult<poll_option::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a poll option (votes cascade).
    pub async fn delete_option(&self, id: &str) -> AppResult<()> {
        PollOption::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ==================== Finalization Commits ====================

    /// Persist the poll's terminal status and the scheduled activity as a
    /// single atomic unit of work.
    pub async fn finalize_with_activity(
        &self,
        poll: poll::ActiveModel,
        activity: activity::ActiveModel,
    ) -> AppResult<(poll::Model, activity::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let poll = poll
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let activity = activity
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok((poll, activity))
    }

    /// Persist the poll's terminal status and the trip's confirmed range as
    /// a single atomic unit of work.
    pub async fn finalize_with_trip(
        &self,
        poll: poll::ActiveModel,
        trip: trip::ActiveModel,
    ) -> AppResult<(poll::Model, trip::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let poll = poll
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let trip = trip
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok((poll, trip))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::poll::{PollStatus, PollType};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_poll(id: &str, activity_id: Option<&str>) -> poll::Model {
        poll::Model {
            id: id.to_string(),
            trip_id: "t1".to_string(),
            activity_id: activity_id.map(ToString::to_string),
            poll_type: PollType::Date,
            title: "When do we go?".to_string(),
            status: PollStatus::Open,
            created_by: "u1".to_string(),
            created_at: Utc::now().into(),
            updated_by: None,
            updated_at: None,
            is_deleted: false,
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let poll = test_poll("p1", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll.clone()]])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let found = repo.find_by_id("p1").await.unwrap();
        assert_eq!(found.unwrap().title, "When do we go?");
    }

    #[tokio::test]
    async fn test_list_by_trip_scoped() {
        let p1 = test_poll("p1", Some("a1"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1]])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let polls = repo
            .list_by_trip("t1", &PollScope::Activity("a1".to_string()), 10, 0)
            .await
            .unwrap();
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].activity_id.as_deref(), Some("a1"));
    }
}
