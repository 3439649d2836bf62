//! Poll service.
//!
//! Poll lifecycle is one-way: open polls accept votes and options, closed
//! polls accept neither but can still be finalized, and finalized polls
//! are immutable. Finalization itself lives in the finalize service.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tripcrew_common::{AppError, AppResult, IdGenerator};
use tripcrew_db::{
    entities::{
        activity::TimeSlot,
        poll::{self, PollStatus, PollType},
        poll_option,
    },
    repositories::{ActivityRepository, PollRepository, PollScope, TripRepository, VoteRepository},
};
use validator::Validate;

use crate::membership::MembershipGate;
use crate::poll_state::ensure_transition;

/// Input for one option of a new poll.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionInput {
    #[validate(length(min = 1, max = 1024))]
    pub text: Option<String>,
    #[validate(url)]
    pub media_url: Option<String>,
    pub metadata: Option<JsonValue>,
    pub date_start: Option<DateTime<FixedOffset>>,
    pub date_end: Option<DateTime<FixedOffset>>,
    pub time_of_day: Option<TimeSlot>,
}

/// Input for creating a poll.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollInput {
    pub trip_id: String,
    /// Binds the poll to an activity's schedule instead of the trip's dates.
    pub activity_id: Option<String>,
    pub poll_type: PollType,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(min = 1, max = 50))]
    #[validate(nested)]
    pub options: Vec<PollOptionInput>,
}

/// Input for updating a poll's title.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePollInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
}

/// An option together with its tally.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionDetail {
    #[serde(flatten)]
    pub option: poll_option::Model,
    pub vote_count: u64,
    pub voter_ids: Vec<String>,
}

/// A poll with its options and tallies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollDetail {
    #[serde(flatten)]
    pub poll: poll::Model,
    pub options: Vec<PollOptionDetail>,
}

/// Service for managing polls and their options.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
    vote_repo: VoteRepository,
    trip_repo: TripRepository,
    activity_repo: ActivityRepository,
    gate: Arc<dyn MembershipGate>,
    id_gen: IdGenerator,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub fn new(
        poll_repo: PollRepository,
        vote_repo: VoteRepository,
        trip_repo: TripRepository,
        activity_repo: ActivityRepository,
        gate: Arc<dyn MembershipGate>,
    ) -> Self {
        Self {
            poll_repo,
            vote_repo,
            trip_repo,
            activity_repo,
            gate,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a poll with its initial options.
    pub async fn create(&self, user_id: &str, input: CreatePollInput) -> AppResult<poll::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let trip = self.trip_repo.get_by_id(&input.trip_id).await?;
        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }

        if let Some(activity_id) = &input.activity_id {
            let activity = self.activity_repo.get_by_id(activity_id).await?;
            if activity.trip_id != trip.id {
                return Err(AppError::BadRequest(
                    "Activity does not belong to this trip".to_string(),
                ));
            }
        }

        for option in &input.options {
            validate_option_content(input.poll_type, option)?;
        }

        let poll_id = self.id_gen.generate();
        let now: DateTime<FixedOffset> = Utc::now().into();

        let poll = poll::ActiveModel {
            id: Set(poll_id.clone()),
            trip_id: Set(trip.id),
            activity_id: Set(input.activity_id),
            poll_type: Set(input.poll_type),
            title: Set(input.title),
            status: Set(PollStatus::Open),
            created_by: Set(user_id.to_string()),
            created_at: Set(now),
            updated_by: Set(None),
            updated_at: Set(None),
            is_deleted: Set(false),
        };

        let options = input
            .options
            .into_iter()
            .map(|o| poll_option::ActiveModel {
                id: Set(self.id_gen.generate()),
                poll_id: Set(poll_id.clone()),
                text: Set(o.text),
                media_url: Set(o.media_url),
                metadata: Set(o.metadata),
                date_start: Set(o.date_start),
                date_end: Set(o.date_end),
                time_of_day: Set(o.time_of_day),
                created_by: Set(user_id.to_string()),
                created_at: Set(now),
            })
            .collect();

        self.poll_repo.create_with_options(poll, options).await
    }

    /// Rename a poll. Creator or leader only; finalized polls are immutable.
    pub async fn update(
        &self,
        user_id: &str,
        poll_id: &str,
        input: UpdatePollInput,
    ) -> AppResult<poll::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let existing = self.poll_repo.get_by_id(poll_id).await?;
        let trip = self.trip_repo.get_by_id(&existing.trip_id).await?;
        self.ensure_can_manage(&existing, &trip.group_id, user_id)
            .await?;
        Self::ensure_mutable(&existing)?;

        let model = poll::ActiveModel {
            id: Set(existing.id),
            title: Set(input.title),
            updated_by: Set(Some(user_id.to_string())),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };

        self.poll_repo.update(model).await
    }

    /// Close a poll to further voting. Creator or leader only.
    pub async fn close(&self, user_id: &str, poll_id: &str) -> AppResult<poll::Model> {
        let existing = self.poll_repo.get_by_id(poll_id).await?;
        let trip = self.trip_repo.get_by_id(&existing.trip_id).await?;
        self.ensure_can_manage(&existing, &trip.group_id, user_id)
            .await?;
        ensure_transition(existing.status, PollStatus::Closed)?;

        let model = poll::ActiveModel {
            id: Set(existing.id),
            status: Set(PollStatus::Closed),
            updated_by: Set(Some(user_id.to_string())),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };

        self.poll_repo.update(model).await
    }

    /// Soft-delete a poll. Creator or leader only; finalized polls are
    /// immutable.
    pub async fn delete(&self, user_id: &str, poll_id: &str) -> AppResult<()> {
        let existing = self.poll_repo.get_by_id(poll_id).await?;
        let trip = self.trip_repo.get_by_id(&existing.trip_id).await?;
        self.ensure_can_manage(&existing, &trip.group_id, user_id)
            .await?;
        Self::ensure_mutable(&existing)?;

        let model = poll::ActiveModel {
            id: Set(existing.id),
            is_deleted: Set(true),
            updated_by: Set(Some(user_id.to_string())),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };

        self.poll_repo.update(model).await?;
        Ok(())
    }

    /// Add an option to an open poll. Any active member may contribute.
    pub async fn add_option(
        &self,
        user_id: &str,
        poll_id: &str,
        input: PollOptionInput,
    ) -> AppResult<poll_option::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let existing = self.poll_repo.get_by_id(poll_id).await?;
        let trip = self.trip_repo.get_by_id(&existing.trip_id).await?;
        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }
        if existing.status != PollStatus::Open {
            return Err(AppError::BadRequest(
                "Options can only be added to an open poll".to_string(),
            ));
        }

        validate_option_content(existing.poll_type, &input)?;

        let model = poll_option::ActiveModel {
            id: Set(self.id_gen.generate()),
            poll_id: Set(existing.id),
            text: Set(input.text),
            media_url: Set(input.media_url),
            metadata: Set(input.metadata),
            date_start: Set(input.date_start),
            date_end: Set(input.date_end),
            time_of_day: Set(input.time_of_day),
            created_by: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.poll_repo.create_option(model).await
    }

    /// Remove an option from an open poll. Its votes cascade away.
    /// Option author, poll creator or leader only.
    pub async fn remove_option(
        &self,
        user_id: &str,
        poll_id: &str,
        option_id: &str,
    ) -> AppResult<()> {
        let existing = self.poll_repo.get_by_id(poll_id).await?;
        let option = self.poll_repo.get_option_by_id(option_id).await?;
        if option.poll_id != existing.id {
            return Err(AppError::BadRequest(
                "Option does not belong to this poll".to_string(),
            ));
        }
        if existing.status != PollStatus::Open {
            return Err(AppError::BadRequest(
                "Options can only be removed from an open poll".to_string(),
            ));
        }

        let trip = self.trip_repo.get_by_id(&existing.trip_id).await?;
        if option.created_by != user_id {
            self.ensure_can_manage(&existing, &trip.group_id, user_id)
                .await?;
        } else if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }

        self.poll_repo.delete_option(option_id).await
    }

    /// A poll with its options and tallies. Member only.
    pub async fn get_detail(&self, user_id: &str, poll_id: &str) -> AppResult<PollDetail> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;
        let trip = self.trip_repo.get_by_id(&poll.trip_id).await?;
        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }

        let options = self.poll_repo.list_options(poll_id).await?;
        let votes = self.vote_repo.find_by_poll(poll_id).await?;

        let options = options
            .into_iter()
            .map(|option| {
                let voter_ids: Vec<String> = votes
                    .iter()
                    .filter(|v| v.poll_option_id == option.id)
                    .map(|v| v.user_id.clone())
                    .collect();
                PollOptionDetail {
                    vote_count: voter_ids.len() as u64,
                    voter_ids,
                    option,
                }
            })
            .collect();

        Ok(PollDetail { poll, options })
    }

    /// List a trip's polls, optionally scoped to trip-level or to one
    /// activity. Member only.
    pub async fn list(
        &self,
        user_id: &str,
        trip_id: &str,
        scope: &PollScope,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<poll::Model>> {
        let trip = self.trip_repo.get_by_id(trip_id).await?;
        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }
        self.poll_repo.list_by_trip(trip_id, scope, limit, offset).await
    }

    async fn ensure_can_manage(
        &self,
        poll: &poll::Model,
        group_id: &str,
        user_id: &str,
    ) -> AppResult<()> {
        if poll.created_by == user_id && self.gate.is_active_member(group_id, user_id).await? {
            return Ok(());
        }
        if self.gate.is_leader(group_id, user_id).await? {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "Only the poll creator or a group leader can do this".to_string(),
        ))
    }

    fn ensure_mutable(poll: &poll::Model) -> AppResult<()> {
        if poll.status == PollStatus::Finalized {
            return Err(AppError::BadRequest(
                "Finalized polls cannot be changed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Check that an option carries content, and that date-poll options carry
/// a valid candidate range.
fn validate_option_content(poll_type: PollType, option: &PollOptionInput) -> AppResult<()> {
    if option.text.is_none()
        && option.media_url.is_none()
        && option.metadata.is_none()
        && option.date_start.is_none()
    {
        return Err(AppError::BadRequest(
            "An option needs text, media, metadata or a date".to_string(),
        ));
    }

    if poll_type == PollType::Date {
        let Some(start) = option.date_start else {
            return Err(AppError::BadRequest(
                "Date poll options require a start date".to_string(),
            ));
        };
        if start < Utc::now() {
            return Err(AppError::BadRequest(
                "Date poll options must lie in the future".to_string(),
            ));
        }
        // A zero-length range is a point in time; only inverted ranges are
        // rejected here. Trip finalization separately requires end > start.
        if let Some(end) = option.date_end
            && end < start
        {
            return Err(AppError::BadRequest(
                "Option end must not precede its start".to_string(),
            ));
        }
    } else if option.time_of_day.is_some() {
        return Err(AppError::BadRequest(
            "Time-of-day only applies to date poll options".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::membership::InMemoryMembership;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tripcrew_db::entities::{poll_option, trip, vote};

    fn closed_poll() -> poll::Model {
        poll::Model {
            id: "p1".to_string(),
            trip_id: "t1".to_string(),
            activity_id: None,
            poll_type: PollType::Ordinary,
            title: "Dinner?".to_string(),
            status: PollStatus::Closed,
            created_by: "u1".to_string(),
            created_at: Utc::now().into(),
            updated_by: None,
            updated_at: None,
            is_deleted: false,
        }
    }

    fn test_trip() -> trip::Model {
        trip::Model {
            id: "t1".to_string(),
            group_id: "g1".to_string(),
            title: "Summer trip".to_string(),
            planning_range_start: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            planning_range_end: chrono::NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
            start_date: None,
            end_date: None,
            created_by: "u1".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
            is_deleted: false,
        }
    }

    fn service(db: MockDatabase, gate: InMemoryMembership) -> PollService {
        let conn = Arc::new(db.into_connection());
        PollService::new(
            PollRepository::new(conn.clone()),
            VoteRepository::new(conn.clone()),
            TripRepository::new(conn.clone()),
            ActivityRepository::new(conn),
            Arc::new(gate),
        )
    }

    fn text_option(text: &str) -> PollOptionInput {
        PollOptionInput {
            text: Some(text.to_string()),
            media_url: None,
            metadata: None,
            date_start: None,
            date_end: None,
            time_of_day: None,
        }
    }

    #[test]
    fn test_option_content_required() {
        let empty = PollOptionInput {
            text: None,
            media_url: None,
            metadata: None,
            date_start: None,
            date_end: None,
            time_of_day: None,
        };
        assert!(validate_option_content(PollType::Ordinary, &empty).is_err());
        assert!(validate_option_content(PollType::Ordinary, &text_option("a")).is_ok());
    }

    #[test]
    fn test_date_option_requires_future_start() {
        let mut option = text_option("camping");
        assert!(validate_option_content(PollType::Date, &option).is_err());

        option.date_start = Some((Utc::now() - Duration::days(1)).into());
        assert!(validate_option_content(PollType::Date, &option).is_err());

        option.date_start = Some((Utc::now() + Duration::days(7)).into());
        assert!(validate_option_content(PollType::Date, &option).is_ok());
    }

    #[test]
    fn test_date_option_range_ordering() {
        let start = Utc::now() + Duration::days(7);
        let mut option = PollOptionInput {
            text: None,
            media_url: None,
            metadata: None,
            date_start: Some(start.into()),
            date_end: Some((start - Duration::hours(1)).into()),
            time_of_day: None,
        };
        assert!(validate_option_content(PollType::Date, &option).is_err());

        // An end equal to the start marks a single point in time
        option.date_end = Some(start.into());
        assert!(validate_option_content(PollType::Date, &option).is_ok());
    }

    #[test]
    fn test_time_of_day_rejected_on_ordinary_options() {
        let mut option = text_option("pizza");
        option.time_of_day = Some(TimeSlot::Dinner);
        assert!(validate_option_content(PollType::Ordinary, &option).is_err());
    }

    #[tokio::test]
    async fn test_add_option_rejected_on_closed_poll() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[closed_poll()]])
            .append_query_results([[test_trip()]]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u1"));

        let err = svc
            .add_option("u1", "p1", text_option("ramen"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_detail_readable_on_closed_poll() {
        let option = poll_option::Model {
            id: "o1".to_string(),
            poll_id: "p1".to_string(),
            text: Some("ramen".to_string()),
            media_url: None,
            metadata: None,
            date_start: None,
            date_end: None,
            time_of_day: None,
            created_by: "u1".to_string(),
            created_at: Utc::now().into(),
        };
        let ballot = vote::Model {
            id: "v1".to_string(),
            poll_id: "p1".to_string(),
            poll_option_id: "o1".to_string(),
            user_id: "u2".to_string(),
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[closed_poll()]])
            .append_query_results([[test_trip()]])
            .append_query_results([[option]])
            .append_query_results([[ballot]]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u1"));

        let detail = svc.get_detail("u1", "p1").await.unwrap();
        assert_eq!(detail.poll.status, PollStatus::Closed);
        assert_eq!(detail.options.len(), 1);
        assert_eq!(detail.options[0].vote_count, 1);
        assert_eq!(detail.options[0].voter_ids, vec!["u2".to_string()]);
    }

    #[tokio::test]
    async fn test_create_requires_at_least_one_option() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u1"));

        let input = CreatePollInput {
            trip_id: "t1".to_string(),
            activity_id: None,
            poll_type: PollType::Ordinary,
            title: "Dinner?".to_string(),
            options: vec![],
        };
        let err = svc.create("u1", input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_requires_membership() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_trip()]]);
        let svc = service(db, InMemoryMembership::new());

        let input = CreatePollInput {
            trip_id: "t1".to_string(),
            activity_id: None,
            poll_type: PollType::Ordinary,
            title: "Dinner?".to_string(),
            options: vec![text_option("pizza")],
        };
        let err = svc.create("u1", input).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
