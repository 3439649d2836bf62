//! Business logic services.

#![allow(missing_docs)]

pub mod activity;
pub mod finalize;
pub mod group;
pub mod poll;
pub mod schedule;
pub mod trip;
pub mod user;
pub mod vote;

pub use activity::{ActivityService, CreateActivityInput, UpdateActivityInput};
pub use finalize::{
    FinalizationService, FinalizeOutcome, FinalizePollInput, derive_activity_schedule,
    derive_trip_range,
};
pub use group::{AddMemberInput, CreateGroupInput, GroupService};
pub use poll::{
    CreatePollInput, PollDetail, PollOptionDetail, PollOptionInput, PollService, UpdatePollInput,
};
pub use schedule::{
    MAX_ACTIVITIES_PER_DAY, MAX_DAY_INDEX, MIN_DAY_INDEX, available_day_indexes,
    ensure_day_index_in_range, time_slot_from_clock, validate_time_logic,
};
pub use trip::{CreateTripInput, TripService};
pub use user::UserService;
pub use vote::{CastVoteInput, ChangeVoteInput, VoteService};
