//! Activity repository.

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use tripcrew_common::{AppError, AppResult};

use crate::entities::{Activity, activity};

/// Repository for activity operations, including the day-slot occupancy
/// queries the schedule allocator relies on.
#[derive(Clone)]
pub struct ActivityRepository {
    db: Arc<DatabaseConnection>,
}

impl ActivityRepository {
    /// Create a new activity repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an activity by ID (excluding soft-deleted rows).
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<activity::Model>> {
        Activity::find_by_id(id)
            .filter(activity::Column::IsDeleted.eq(false))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an activity by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<activity::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Activity not found: {id}")))
    }

    /// List activities of a trip.
    pub async fn list_by_trip(
        &self,
        trip_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<activity::Model>> {
        Activity::find()
            .filter(activity::Column::TripId.eq(trip_id))
            .filter(activity::Column::IsDeleted.eq(false))
            .order_by(activity::Column::CreatedAt, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count scheduled activities on a given trip day, optionally excluding
    /// one activity (the one being moved or updated).
    pub async fn count_scheduled_on(
        &self,
        trip_id: &str,
        date: NaiveDate,
        exclude_id: Option<&str>,
    ) -> AppResult<u64> {
        let mut query = Activity::find()
            .filter(activity::Column::TripId.eq(trip_id))
            .filter(activity::Column::Date.eq(date))
            .filter(activity::Column::IsDeleted.eq(false));

        if let Some(id) = exclude_id {
            query = query.filter(activity::Column::Id.ne(id));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the day indexes already taken on a given trip day.
    pub async fn occupied_day_indexes(
        &self,
        trip_id: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<i32>> {
        let rows = Activity::find()
            .filter(activity::Column::TripId.eq(trip_id))
            .filter(activity::Column::Date.eq(date))
            .filter(activity::Column::ScheduleDayIndex.is_not_null())
            .filter(activity::Column::IsDeleted.eq(false))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().filter_map(|a| a.schedule_day_index).collect())
    }

    /// Check whether a (trip, date, day index) triple is occupied by a
    /// different activity.
    pub async fn day_index_taken(
        &self,
        trip_id: &str,
        date: NaiveDate,
        day_index: i32,
        exclude_id: Option<&str>,
    ) -> AppResult<bool> {
        let mut query = Activity::find()
            .filter(activity::Column::TripId.eq(trip_id))
            .filter(activity::Column::Date.eq(date))
            .filter(activity::Column::ScheduleDayIndex.eq(day_index))
            .filter(activity::Column::IsDeleted.eq(false));

        if let Some(id) = exclude_id {
            query = query.filter(activity::Column::Id.ne(id));
        }

        let count = query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Create a new activity. Losing a race for a (trip, date, day index)
    /// triple surfaces as a Conflict.
    pub async fn create(&self, model: activity::ActiveModel) -> AppResult<activity::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// Update an activity. Losing a race for a (trip, date, day index)
    /// triple surfaces as a Conflict.
    pub async fn update(&self, model: activity::ActiveModel) -> AppResult<activity::Model> {
        model.update(self.db.as_ref()).await.map_err(map_write_err)
    }
}

fn map_write_err(e: sea_orm::DbErr) -> AppError {
    classify_write_err(e.sql_err(), &e)
}

fn classify_write_err(sql_err: Option<sea_orm::SqlErr>, e: &sea_orm::DbErr) -> AppError {
    if matches!(sql_err, Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) {
        AppError::Conflict("Day index already taken on that date".to_string())
    } else {
        AppError::Database(e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::activity::ActivityStatus;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_activity(id: &str, day_index: Option<i32>) -> activity::Model {
        activity::Model {
            id: id.to_string(),
            trip_id: "t1".to_string(),
            title: "Hike".to_string(),
            status: ActivityStatus::Scheduled,
            date: NaiveDate::from_ymd_opt(2025, 7, 2),
            start_time: None,
            end_time: None,
            schedule_day_index: day_index,
            schedule_slot: None,
            created_by: "u1".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
            is_deleted: false,
        }
    }

    #[tokio::test]
    async fn test_occupied_day_indexes() {
        let a1 = test_activity("a1", Some(1));
        let a2 = test_activity("a2", Some(4));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a1, a2]])
                .into_connection(),
        );

        let repo = ActivityRepository::new(db);
        let date = NaiveDate::from_ymd_opt(2025, 7, 2).unwrap();
        let occupied = repo.occupied_day_indexes("t1", date).await.unwrap();
        assert_eq!(occupied, vec![1, 4]);
    }

    #[test]
    fn test_racing_day_slot_write_maps_to_conflict() {
        let db_err = sea_orm::DbErr::Custom("duplicate key".to_string());

        let unique = sea_orm::SqlErr::UniqueConstraintViolation("duplicate key".to_string());
        assert!(matches!(
            classify_write_err(Some(unique), &db_err),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            classify_write_err(None, &db_err),
            AppError::Database(_)
        ));
    }
}
