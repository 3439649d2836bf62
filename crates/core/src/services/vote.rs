//! Vote service.
//!
//! Ordinary polls allow one vote per user; date polls allow one vote per
//! option so members can approve several candidate dates. The database
//! backs the per-option rule with a unique index, so a racing duplicate
//! cast loses with a conflict instead of a double count.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tripcrew_common::{AppError, AppResult, IdGenerator};
use tripcrew_db::{
    entities::{
        poll::{self, PollStatus, PollType},
        vote,
    },
    repositories::{PollRepository, TripRepository, VoteRepository},
};

use crate::membership::MembershipGate;

/// Input for casting a vote.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteInput {
    pub poll_option_id: String,
}

/// Input for moving a vote to a different option of the same poll.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeVoteInput {
    pub poll_id: String,
    pub poll_option_id: String,
}

/// Service for the vote ledger.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    poll_repo: PollRepository,
    trip_repo: TripRepository,
    gate: Arc<dyn MembershipGate>,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub fn new(
        vote_repo: VoteRepository,
        poll_repo: PollRepository,
        trip_repo: TripRepository,
        gate: Arc<dyn MembershipGate>,
    ) -> Self {
        Self {
            vote_repo,
            poll_repo,
            trip_repo,
            gate,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast a vote for an option of an open poll.
    pub async fn cast(&self, user_id: &str, input: CastVoteInput) -> AppResult<vote::Model> {
        let option = self.poll_repo.get_option_by_id(&input.poll_option_id).await?;
        let poll = self.poll_repo.get_by_id(&option.poll_id).await?;
        let trip = self.trip_repo.get_by_id(&poll.trip_id).await?;

        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }
        if poll.status != PollStatus::Open {
            return Err(AppError::BadRequest(
                "Votes can only be cast on an open poll".to_string(),
            ));
        }

        match poll.poll_type {
            PollType::Ordinary => {
                let existing = self
                    .vote_repo
                    .find_by_user_and_poll(user_id, &poll.id)
                    .await?;
                if !existing.is_empty() {
                    return Err(AppError::Conflict(
                        "Already voted in this poll".to_string(),
                    ));
                }
            }
            PollType::Date => {
                if self
                    .vote_repo
                    .has_vote_for_option(user_id, &option.id)
                    .await?
                {
                    return Err(AppError::Conflict(
                        "Already voted for this option".to_string(),
                    ));
                }
            }
        }

        let model = vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            poll_id: Set(poll.id),
            poll_option_id: Set(option.id),
            user_id: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.vote_repo.create(model).await
    }

    /// Move an ordinary-poll vote to a different option. Date polls have
    /// no single vote to move; retract per option instead.
    pub async fn change(&self, user_id: &str, input: ChangeVoteInput) -> AppResult<vote::Model> {
        let poll = self.poll_repo.get_by_id(&input.poll_id).await?;
        if poll.poll_type == PollType::Date {
            return Err(AppError::BadRequest(
                "Date poll votes are retracted per option, not changed".to_string(),
            ));
        }
        if poll.status != PollStatus::Open {
            return Err(AppError::BadRequest(
                "Votes can only be changed on an open poll".to_string(),
            ));
        }

        let trip = self.trip_repo.get_by_id(&poll.trip_id).await?;
        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }

        let option = self.poll_repo.get_option_by_id(&input.poll_option_id).await?;
        if option.poll_id != poll.id {
            return Err(AppError::BadRequest(
                "Option does not belong to this poll".to_string(),
            ));
        }

        let existing = self
            .vote_repo
            .find_by_user_and_poll(user_id, &poll.id)
            .await?;
        if existing.is_empty() {
            return Err(AppError::NotFound(
                "No vote to change in this poll".to_string(),
            ));
        }

        let model = vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            poll_id: Set(poll.id.clone()),
            poll_option_id: Set(option.id),
            user_id: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.vote_repo.replace_for_poll(user_id, &poll.id, model).await
    }

    /// Remove a vote. Owner only; the poll must still be open.
    pub async fn remove(&self, user_id: &str, vote_id: &str) -> AppResult<()> {
        let vote = self.vote_repo.get_by_id(vote_id).await?;
        if vote.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the voter can remove their vote".to_string(),
            ));
        }

        let poll = self.poll_repo.get_by_id(&vote.poll_id).await?;
        if poll.status != PollStatus::Open {
            return Err(AppError::BadRequest(
                "Votes can only be removed from an open poll".to_string(),
            ));
        }

        self.vote_repo.delete(vote).await
    }

    /// All votes cast in a poll. Member only.
    pub async fn poll_votes(&self, user_id: &str, poll_id: &str) -> AppResult<Vec<vote::Model>> {
        let poll = self.ensure_member_of_poll(user_id, poll_id).await?;
        self.vote_repo.find_by_poll(&poll.id).await
    }

    /// The caller's votes within a poll. Member only.
    pub async fn user_votes(&self, user_id: &str, poll_id: &str) -> AppResult<Vec<vote::Model>> {
        let poll = self.ensure_member_of_poll(user_id, poll_id).await?;
        self.vote_repo.find_by_user_and_poll(user_id, &poll.id).await
    }

    async fn ensure_member_of_poll(
        &self,
        user_id: &str,
        poll_id: &str,
    ) -> AppResult<poll::Model> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;
        let trip = self.trip_repo.get_by_id(&poll.trip_id).await?;
        if !self.gate.is_active_member(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }
        Ok(poll)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::membership::InMemoryMembership;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tripcrew_db::entities::{poll, poll_option, trip};

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

    fn test_poll(poll_type: PollType, status: PollStatus) -> poll::Model {
        poll::Model {
            id: "p1".to_string(),
            trip_id: "t1".to_string(),
            activity_id: None,
            poll_type,
            title: "Dinner?".to_string(),
            status,
            created_by: "u1".to_string(),
            created_at: Utc::now().into(),
            updated_by: None,
            updated_at: None,
            is_deleted: false,
        }
    }

    fn test_option(id: &str) -> poll_option::Model {
        poll_option::Model {
            id: id.to_string(),
            poll_id: "p1".to_string(),
            text: Some("pizza".to_string()),
            media_url: None,
            metadata: None,
            date_start: None,
            date_end: None,
            time_of_day: None,
            created_by: "u1".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn test_vote(id: &str, option_id: &str) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            poll_id: "p1".to_string(),
            poll_option_id: option_id.to_string(),
            user_id: "u2".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase, gate: InMemoryMembership) -> VoteService {
        let conn = Arc::new(db.into_connection());
        VoteService::new(
            VoteRepository::new(conn.clone()),
            PollRepository::new(conn.clone()),
            TripRepository::new(conn),
            Arc::new(gate),
        )
    }

    #[tokio::test]
    async fn test_cast_rejects_closed_poll() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_option("o1")]])
            .append_query_results([[test_poll(PollType::Ordinary, PollStatus::Closed)]])
            .append_query_results([[test_trip()]]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u2"));

        let err = svc
            .cast(
                "u2",
                CastVoteInput {
                    poll_option_id: "o1".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_cast_ordinary_is_single_vote() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_option("o2")]])
            .append_query_results([[test_poll(PollType::Ordinary, PollStatus::Open)]])
            .append_query_results([[test_trip()]])
            .append_query_results([[test_vote("v1", "o1")]]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u2"));

        let err = svc
            .cast(
                "u2",
                CastVoteInput {
                    poll_option_id: "o2".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_cast_date_poll_allows_multiple_options() {
        // u2 already voted for o1; a vote for the distinct option o2 goes
        // through because date polls are one vote per option.
        let mut no_vote = std::collections::BTreeMap::new();
        no_vote.insert("num_items", sea_orm::Value::BigInt(Some(0)));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_option("o2")]])
            .append_query_results([[test_poll(PollType::Date, PollStatus::Open)]])
            .append_query_results([[test_trip()]])
            .append_query_results([[no_vote]])
            .append_query_results([[test_vote("v2", "o2")]]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u2"));

        let vote = svc
            .cast(
                "u2",
                CastVoteInput {
                    poll_option_id: "o2".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(vote.poll_option_id, "o2");
    }

    #[tokio::test]
    async fn test_cast_date_poll_rejects_repeat_option() {
        let mut has_vote = std::collections::BTreeMap::new();
        has_vote.insert("num_items", sea_orm::Value::BigInt(Some(1)));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_option("o1")]])
            .append_query_results([[test_poll(PollType::Date, PollStatus::Open)]])
            .append_query_results([[test_trip()]])
            .append_query_results([[has_vote]]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u2"));

        let err = svc
            .cast(
                "u2",
                CastVoteInput {
                    poll_option_id: "o1".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_change_rejected_for_date_polls() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_poll(PollType::Date, PollStatus::Open)]]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u2"));

        let err = svc
            .change(
                "u2",
                ChangeVoteInput {
                    poll_id: "p1".to_string(),
                    poll_option_id: "o2".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_change_requires_existing_vote() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_poll(PollType::Ordinary, PollStatus::Open)]])
            .append_query_results([[test_trip()]])
            .append_query_results([[test_option("o2")]])
            .append_query_results([Vec::<vote::Model>::new()]);
        let svc = service(db, InMemoryMembership::new().with_member("g1", "u2"));

        let err = svc
            .change(
                "u2",
                ChangeVoteInput {
                    poll_id: "p1".to_string(),
                    poll_option_id: "o2".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
