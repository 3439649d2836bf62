//! Database repositories.

#![allow(missing_docs)]

pub mod activity;
pub mod group;
pub mod poll;
pub mod trip;
pub mod user;
pub mod vote;

pub use activity::ActivityRepository;
pub use group::GroupRepository;
pub use poll::{PollRepository, PollScope};
pub use trip::TripRepository;
pub use user::UserRepository;
pub use vote::VoteRepository;
