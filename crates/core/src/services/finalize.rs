//! Finalization engine.
//!
//! A group leader commits one option of a date poll as the authoritative
//! outcome. Activity-scoped polls write the option's date and times into
//! the activity's schedule; trip-scoped polls confirm the trip's date
//! range and widen the planning range around it. The poll's terminal
//! status and the mutated row persist in one transaction.

use std::sync::Arc;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tripcrew_common::{AppError, AppResult};
use tripcrew_db::{
    entities::{
        activity::{self, ActivityStatus, TimeSlot},
        poll::{self, PollStatus, PollType},
        poll_option, trip,
    },
    repositories::{ActivityRepository, PollRepository, TripRepository},
};

use crate::membership::MembershipGate;
use crate::poll_state::ensure_transition;
use crate::services::schedule::{
    MAX_ACTIVITIES_PER_DAY, time_slot_from_clock, validate_time_logic,
};

/// Input for finalizing a date poll.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizePollInput {
    pub poll_option_id: String,
}

/// What a finalization wrote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "target")]
pub enum FinalizeOutcome {
    /// The winning option became the activity's schedule.
    Activity {
        poll: poll::Model,
        activity: activity::Model,
    },
    /// The winning option became the trip's confirmed date range.
    Trip { poll: poll::Model, trip: trip::Model },
}

/// Schedule fields derived from a winning activity-poll option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySchedule {
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub slot: Option<TimeSlot>,
}

/// Date fields derived from a winning trip-poll option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub planning_range_start: NaiveDate,
    pub planning_range_end: NaiveDate,
}

/// Service that finalizes date polls.
#[derive(Clone)]
pub struct FinalizationService {
    poll_repo: PollRepository,
    trip_repo: TripRepository,
    activity_repo: ActivityRepository,
    gate: Arc<dyn MembershipGate>,
}

impl FinalizationService {
    /// Create a new finalization service.
    #[must_use]
    pub fn new(
        poll_repo: PollRepository,
        trip_repo: TripRepository,
        activity_repo: ActivityRepository,
        gate: Arc<dyn MembershipGate>,
    ) -> Self {
        Self {
            poll_repo,
            trip_repo,
            activity_repo,
            gate,
        }
    }

    /// Commit one option of a date poll as its outcome. Leader only.
    pub async fn finalize(
        &self,
        user_id: &str,
        poll_id: &str,
        input: FinalizePollInput,
    ) -> AppResult<FinalizeOutcome> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;
        let trip = self.trip_repo.get_by_id(&poll.trip_id).await?;

        if !self.gate.is_leader(&trip.group_id, user_id).await? {
            return Err(AppError::Forbidden(
                "Only a group leader can finalize a poll".to_string(),
            ));
        }
        if poll.poll_type != PollType::Date {
            return Err(AppError::BadRequest(
                "Only date polls can be finalized".to_string(),
            ));
        }
        if poll.status == PollStatus::Finalized {
            return Err(AppError::Conflict(
                "Poll is already finalized".to_string(),
            ));
        }
        ensure_transition(poll.status, PollStatus::Finalized)?;

        let option = self.poll_repo.get_option_by_id(&input.poll_option_id).await?;
        if option.poll_id != poll.id {
            return Err(AppError::BadRequest(
                "Option does not belong to this poll".to_string(),
            ));
        }
        let Some(date_start) = option.date_start else {
            return Err(AppError::BadRequest(
                "The winning option has no start date".to_string(),
            ));
        };

        let finalized_poll = poll::ActiveModel {
            id: Set(poll.id.clone()),
            status: Set(PollStatus::Finalized),
            updated_by: Set(Some(user_id.to_string())),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };

        if let Some(activity_id) = &poll.activity_id {
            let activity = self.activity_repo.get_by_id(activity_id).await?;
            let schedule = derive_activity_schedule(&option, date_start)?;

            // Re-check capacity only when the activity moves to a new day.
            if activity.date != Some(schedule.date) {
                let count = self
                    .activity_repo
                    .count_scheduled_on(&trip.id, schedule.date, Some(&activity.id))
                    .await?;
                if count >= MAX_ACTIVITIES_PER_DAY {
                    return Err(AppError::BadRequest(format!(
                        "Day {} already has {MAX_ACTIVITIES_PER_DAY} scheduled activities",
                        schedule.date
                    )));
                }
            }

            // A day index assigned for the old date no longer applies.
            let day_index = if activity.date == Some(schedule.date) {
                activity.schedule_day_index
            } else {
                None
            };

            let scheduled = activity::ActiveModel {
                id: Set(activity.id),
                status: Set(ActivityStatus::Scheduled),
                date: Set(Some(schedule.date)),
                start_time: Set(schedule.start_time),
                end_time: Set(schedule.end_time),
                schedule_day_index: Set(day_index),
                schedule_slot: Set(schedule.slot),
                updated_at: Set(Some(Utc::now().into())),
                ..Default::default()
            };

            let (poll, activity) = self
                .poll_repo
                .finalize_with_activity(finalized_poll, scheduled)
                .await?;
            Ok(FinalizeOutcome::Activity { poll, activity })
        } else {
            let Some(date_end) = option.date_end else {
                return Err(AppError::BadRequest(
                    "Trip date options require an end date".to_string(),
                ));
            };
            let range = derive_trip_range(date_start, date_end)?;

            let confirmed = trip::ActiveModel {
                id: Set(trip.id),
                start_date: Set(Some(range.start_date)),
                end_date: Set(Some(range.end_date)),
                planning_range_start: Set(range.planning_range_start),
                planning_range_end: Set(range.planning_range_end),
                updated_at: Set(Some(Utc::now().into())),
                ..Default::default()
            };

            let (poll, trip) = self
                .poll_repo
                .finalize_with_trip(finalized_poll, confirmed)
                .await?;
            Ok(FinalizeOutcome::Trip { poll, trip })
        }
    }
}

/// Derive the schedule an activity-poll option stands for.
///
/// A start at midnight with no time-of-day bucket is a whole-day option
/// and leaves both clock times unset.
pub fn derive_activity_schedule(
    option: &poll_option::Model,
    date_start: DateTime<FixedOffset>,
) -> AppResult<ActivitySchedule> {
    let date = date_start.date_naive();
    let whole_day =
        date_start.time() == NaiveTime::MIN && option.time_of_day.is_none();

    let start_time = if whole_day { None } else { Some(date_start.time()) };
    let end_time = match option.date_end {
        Some(end) if !whole_day => {
            if end.date_naive() != date {
                return Err(AppError::BadRequest(
                    "An activity schedule spans a single day".to_string(),
                ));
            }
            Some(end.time())
        }
        _ => None,
    };

    validate_time_logic(start_time, end_time, option.time_of_day)?;

    let slot = option
        .time_of_day
        .or_else(|| start_time.map(time_slot_from_clock));

    Ok(ActivitySchedule {
        date,
        start_time,
        end_time,
        slot,
    })
}

/// Derive the confirmed and widened planning range a trip-poll option
/// stands for. The planning range gains one day of slack on each side.
pub fn derive_trip_range(
    date_start: DateTime<FixedOffset>,
    date_end: DateTime<FixedOffset>,
) -> AppResult<TripRange> {
    let start_date = date_start.date_naive();
    let end_date = date_end.date_naive();
    if end_date <= start_date {
        return Err(AppError::BadRequest(
            "Trip end must be after its start".to_string(),
        ));
    }

    let planning_range_start = start_date
        .checked_sub_days(Days::new(1))
        .ok_or_else(|| AppError::BadRequest("Trip start is out of range".to_string()))?;
    let planning_range_end = end_date
        .checked_add_days(Days::new(1))
        .ok_or_else(|| AppError::BadRequest("Trip end is out of range".to_string()))?;

    Ok(TripRange {
        start_date,
        end_date,
        planning_range_start,
        planning_range_end,
    })
}
