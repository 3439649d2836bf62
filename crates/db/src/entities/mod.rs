//! Database entities.

#![allow(missing_docs)]

pub mod activity;
pub mod group;
pub mod group_member;
pub mod poll;
pub mod poll_option;
pub mod trip;
pub mod user;
pub mod vote;

pub use activity::Entity as Activity;
pub use group::Entity as Group;
pub use group_member::Entity as GroupMember;
pub use poll::Entity as Poll;
pub use poll_option::Entity as PollOption;
pub use trip::Entity as Trip;
pub use user::Entity as User;
pub use vote::Entity as Vote;
