//! Activity service.
//!
//! Owns the schedule-slot allocation rules: a trip day holds at most ten
//! scheduled activities, each addressable by a day index in 1..=10, and
//! clock times must agree with their time-of-day bucket.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::Set;
use serde::Deserialize;
use tripcrew_common::{AppError, AppResult, IdGenerator};
use tripcrew_db::{
    entities::activity::{self, ActivityStatus, TimeSlot},
    repositories::{ActivityRepository, TripRepository},
};
use validator::Validate;

use crate::membership::MembershipGate;
use crate::services::schedule::{
    MAX_ACTIVITIES_PER_DAY, available_day_indexes, ensure_day_index_in_range, validate_time_logic,
};

/// Input for creating an activity.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityInput {
    pub trip_id: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub schedule_day_index: Option<i32>,
    pub schedule_slot: Option<TimeSlot>,
}

/// Input for updating an activity's schedule fields.
///
/// `None` leaves a field untouched; the nested `Option` clears it.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    pub date: Option<Option<NaiveDate>>,
    pub start_time: Option<Option<NaiveTime>>,
    pub end_time: Option<Option<NaiveTime>>,
    pub schedule_day_index: Option<Option<i32>>,
    pub schedule_slot: Option<Option<TimeSlot>>,
}

/// Service for managing activities and their schedule placement.
#[derive(Clone)]
pub struct ActivityService {
    activity_repo: ActivityRepository,
    trip_repo: TripRepository,
    gate: Arc<dyn MembershipGate>,
    id_gen: IdGenerator,
}

impl ActivityService {
    /// Create a new activity service.
    #[must_use]
    pub fn new(
        activity_repo: ActivityRepository,
        trip_repo: TripRepository,
        gate: Arc<dyn MembershipGate>,
    ) -> Self {
        Self {
            activity_repo,
            trip_repo,
            gate,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an activity. Having a date makes it `Scheduled`, otherwise
    /// it stays an `Idea`.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateActivityInput,
    ) -> AppResult<activity::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let trip = self.trip_repo.get_by_id(&input.trip_id).await?;
        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }

        validate_time_logic(input.start_time, input.end_time, input.schedule_slot)?;

        if input.schedule_day_index.is_some() && input.date.is_none() {
            return Err(AppError::BadRequest(
                "A day index requires a date".to_string(),
            ));
        }

        if let Some(date) = input.date {
            self.ensure_day_capacity(&trip.id, date, None).await?;
            if let Some(idx) = input.schedule_day_index {
                self.ensure_day_index_free(&trip.id, date, idx, None).await?;
            }
        }

        let status = if input.date.is_some() {
            ActivityStatus::Scheduled
        } else {
            ActivityStatus::Idea
        };

        // A bare start time still lands in a bucket.
        let slot = input
            .schedule_slot
            .or_else(|| input.start_time.map(super::schedule::time_slot_from_clock));

        let model = activity::ActiveModel {
            id: Set(self.id_gen.generate()),
            trip_id: Set(trip.id),
            title: Set(input.title),
            status: Set(status),
            date: Set(input.date),
            start_time: Set(input.start_time),
            end_time: Set(input.end_time),
            schedule_day_index: Set(input.schedule_day_index),
            schedule_slot: Set(slot),
            created_by: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
            is_deleted: Set(false),
        };

        self.activity_repo.create(model).await
    }

    /// Update an activity, re-running the allocation checks against the
    /// schedule state that would result.
    pub async fn update(
        &self,
        user_id: &str,
        activity_id: &str,
        input: UpdateActivityInput,
    ) -> AppResult<activity::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let existing = self.activity_repo.get_by_id(activity_id).await?;
        let trip = self.trip_repo.get_by_id(&existing.trip_id).await?;
        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }

        let date = input.date.unwrap_or(existing.date);
        let start_time = input.start_time.unwrap_or(existing.start_time);
        let end_time = input.end_time.unwrap_or(existing.end_time);
        let day_index = input.schedule_day_index.unwrap_or(existing.schedule_day_index);
        let mut slot = input.schedule_slot.unwrap_or(existing.schedule_slot);

        // A changed start time invalidates an inherited bucket.
        if input.start_time.is_some() && input.schedule_slot.is_none() {
            slot = start_time.map(super::schedule::time_slot_from_clock);
        }

        validate_time_logic(start_time, end_time, slot)?;

        if day_index.is_some() && date.is_none() {
            return Err(AppError::BadRequest(
                "A day index requires a date".to_string(),
            ));
        }

        if let Some(date) = date {
            // Moving within the same day never changes its count.
            if existing.date != Some(date) {
                self.ensure_day_capacity(&trip.id, date, Some(activity_id))
                    .await?;
            }
            if let Some(idx) = day_index {
                self.ensure_day_index_free(&trip.id, date, idx, Some(activity_id))
                    .await?;
            }
        }

        let status = if date.is_some() {
            ActivityStatus::Scheduled
        } else {
            ActivityStatus::Idea
        };

        let model = activity::ActiveModel {
            id: Set(existing.id),
            trip_id: Set(existing.trip_id),
            title: Set(input.title.unwrap_or(existing.title)),
            status: Set(status),
            date: Set(date),
            start_time: Set(start_time),
            end_time: Set(end_time),
            schedule_day_index: Set(day_index),
            schedule_slot: Set(slot),
            created_by: Set(existing.created_by),
            created_at: Set(existing.created_at),
            updated_at: Set(Some(Utc::now().into())),
            is_deleted: Set(existing.is_deleted),
        };

        self.activity_repo.update(model).await
    }

    /// Get an activity. Member only.
    pub async fn get(&self, user_id: &str, activity_id: &str) -> AppResult<activity::Model> {
        let activity = self.activity_repo.get_by_id(activity_id).await?;
        let trip = self.trip_repo.get_by_id(&activity.trip_id).await?;
        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }
        Ok(activity)
    }

    /// List a trip's activities. Member only.
    pub async fn list(
        &self,
        user_id: &str,
        trip_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<activity::Model>> {
        let trip = self.trip_repo.get_by_id(trip_id).await?;
        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }
        self.activity_repo.list_by_trip(trip_id, limit, offset).await
    }

    /// The free day indexes on a trip day. Member only.
    pub async fn free_day_indexes(
        &self,
        user_id: &str,
        trip_id: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<i32>> {
        let trip = self.trip_repo.get_by_id(trip_id).await?;
        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }
        let occupied = self.activity_repo.occupied_day_indexes(trip_id, date).await?;
        Ok(available_day_indexes(&occupied))
    }

    async fn ensure_day_capacity(
        &self,
        trip_id: &str,
        date: NaiveDate,
        exclude_id: Option<&str>,
    ) -> AppResult<()> {
        let count = self
            .activity_repo
            .count_scheduled_on(trip_id, date, exclude_id)
            .await?;
        if count >= MAX_ACTIVITIES_PER_DAY {
            return Err(AppError::BadRequest(format!(
                "Day {date} already has {MAX_ACTIVITIES_PER_DAY} scheduled activities"
            )));
        }
        Ok(())
    }

    async fn ensure_day_index_free(
        &self,
        trip_id: &str,
        date: NaiveDate,
        day_index: i32,
        exclude_id: Option<&str>,
    ) -> AppResult<()> {
        ensure_day_index_in_range(day_index)?;
        if self
            .activity_repo
            .day_index_taken(trip_id, date, day_index, exclude_id)
            .await?
        {
            return Err(AppError::BadRequest(format!(
                "Day index {day_index} on {date} is already taken"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::membership::InMemoryMembership;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tripcrew_db::entities::trip;

    fn test_trip() -> trip::Model {
        trip::Model {
            id: "t1".to_string(),
            group_id: "g1".to_string(),
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

    fn service(db: MockDatabase, gate: InMemoryMembership) -> ActivityService {
        let conn = Arc::new(db.into_connection());
        ActivityService::new(
            ActivityRepository::new(conn.clone()),
            TripRepository::new(conn),
            Arc::new(gate),
        )
    }

    fn input() -> CreateActivityInput {
        CreateActivityInput {
            trip_id: "t1".to_string(),
            title: "Hike".to_string(),
            date: None,
            start_time: None,
            end_time: None,
            schedule_day_index: None,
            schedule_slot: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_membership() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_trip()]]);
        let svc = service(db, InMemoryMembership::new());
        let err = svc.create("u1", input()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_slot_mismatch() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_trip()]]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u1"));

        let mut bad = input();
        bad.start_time = NaiveTime::from_hms_opt(9, 0, 0);
        bad.schedule_slot = Some(TimeSlot::Evening);
        let err = svc.create("u1", bad).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_day_index_without_date() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_trip()]]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u1"));

        let mut bad = input();
        bad.schedule_day_index = Some(3);
        let err = svc.create("u1", bad).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_full_day() {
        let mut count_row = std::collections::BTreeMap::new();
        count_row.insert("num_items", sea_orm::Value::BigInt(Some(10)));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_trip()]])
            .append_query_results([[count_row]]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u1"));

        let mut eleventh = input();
        eleventh.date = NaiveDate::from_ymd_opt(2025, 7, 2);
        let err = svc.create("u1", eleventh).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_taken_day_index() {
        let mut count_row = std::collections::BTreeMap::new();
        count_row.insert("num_items", sea_orm::Value::BigInt(Some(3)));
        let mut taken_row = std::collections::BTreeMap::new();
        taken_row.insert("num_items", sea_orm::Value::BigInt(Some(1)));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_trip()]])
            .append_query_results([[count_row]])
            .append_query_results([[taken_row]]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u1"));

        let mut clashing = input();
        clashing.date = NaiveDate::from_ymd_opt(2025, 7, 2);
        clashing.schedule_day_index = Some(3);
        let err = svc.create("u1", clashing).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_day_index() {
        let mut count_row = std::collections::BTreeMap::new();
        count_row.insert("num_items", sea_orm::Value::BigInt(Some(0)));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_trip()]])
            .append_query_results([[count_row]]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u1"));

        let mut bad = input();
        bad.date = NaiveDate::from_ymd_opt(2025, 7, 2);
        bad.schedule_day_index = Some(11);
        let err = svc.create("u1", bad).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
