//! Core business logic for tripcrew.

pub mod membership;
pub mod poll_state;
pub mod services;

pub use membership::{DbMembershipGate, InMemoryMembership, MembershipGate};
pub use services::*;
