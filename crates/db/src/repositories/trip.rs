//! Trip repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    QuerySelect,
};
use tripcrew_common::{AppError, AppResult};

use crate::entities::{Trip, trip};

/// Repository for trip operations.
#[derive(Clone)]
pub struct TripRepository {
    db: Arc<DatabaseConnection>,
}

impl TripRepository {
    /// Create a new trip repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a trip by ID (excluding soft-deleted rows).
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<trip::Model>> {
        Trip::find_by_id(id)
            .filter(trip::Column::IsDeleted.eq(false))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a trip by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<trip::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip not found: {id}")))
    }

    /// List trips of a group, newest first.
    pub async fn list_by_group(
        &self,
        group_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<trip::Model>> {
        Trip::find()
            .filter(trip::Column::GroupId.eq(group_id))
            .filter(trip::Column::IsDeleted.eq(false))
            .order_by(trip::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new trip.
    pub async fn create(&self, model: trip::ActiveModel) -> AppResult<trip::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a trip.
    pub async fn update(&self, model: trip::ActiveModel) -> AppResult<trip::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_trip(id: &str, group_id: &str) -> trip::Model {
        trip::Model {
            id: id.to_string(),
            group_id: group_id.to_string(),
            title: "Summer trip".to_string(),
            planning_range_start: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            planning_range_end: NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
            start_date: None,
            end_date: None,
            created_by: "u1".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
            is_deleted: false,
        }
    }

    #[tokio::test]
    async fn test_list_by_group() {
        let t1 = test_trip("t1", "g1");
        let t2 = test_trip("t2", "g1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[t1, t2]])
                .into_connection(),
        );

        let repo = TripRepository::new(db);
        let trips = repo.list_by_group("g1", 10, 0).await.unwrap();
        assert_eq!(trips.len(), 2);
    }
}
