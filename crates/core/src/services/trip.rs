//! Trip service.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::Set;
use serde::Deserialize;
use tripcrew_common::{AppError, AppResult, IdGenerator};
use tripcrew_db::{entities::trip, repositories::TripRepository};
use validator::Validate;

use crate::membership::MembershipGate;

/// Input for creating a trip.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripInput {
    pub group_id: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    pub planning_range_start: NaiveDate,
    pub planning_range_end: NaiveDate,
}

/// Service for managing trips.
#[derive(Clone)]
pub struct TripService {
    trip_repo: TripRepository,
    gate: Arc<dyn MembershipGate>,
    id_gen: IdGenerator,
}

impl TripService {
    /// Create a new trip service.
    #[must_use]
    pub fn new(trip_repo: TripRepository, gate: Arc<dyn MembershipGate>) -> Self {
        Self {
            trip_repo,
            gate,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a trip inside a group's planning envelope.
    pub async fn create(&self, user_id: &str, input: CreateTripInput) -> AppResult<trip::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if input.planning_range_end < input.planning_range_start {
            return Err(AppError::BadRequest(
                "Planning range end must not be before its start".to_string(),
            ));
        }

        if !self
            .gate
            .is_active_member(&input.group_id, user_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }

        let model = trip::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(input.group_id),
            title: Set(input.title),
            planning_range_start: Set(input.planning_range_start),
            planning_range_end: Set(input.planning_range_end),
            start_date: Set(None),
            end_date: Set(None),
            created_by: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
            is_deleted: Set(false),
        };

        self.trip_repo.create(model).await
    }

    /// Get a trip. Member only.
    pub async fn get(&self, user_id: &str, trip_id: &str) -> AppResult<trip::Model> {
        let trip = self.trip_repo.get_by_id(trip_id).await?;

        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }

        Ok(trip)
    }

    /// List a group's trips. Member only.
    pub async fn list(
        &self,
        user_id: &str,
        group_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<trip::Model>> {
        if !self.gate.is_active_member(group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }

        self.trip_repo.list_by_group(group_id, limit, offset).await
    }
}
