//! Poll status transition table.
//!
//! The allowed transitions are `Open -> Closed`, `Open -> Finalized` and
//! `Closed -> Finalized`. Everything else, notably anything leaving
//! `Finalized`, is rejected here so no operation re-checks the rules ad hoc.

use tripcrew_common::{AppError, AppResult};
use tripcrew_db::entities::poll::PollStatus;

/// Whether a poll may move from `from` to `to`.
#[must_use]
pub const fn can_transition(from: PollStatus, to: PollStatus) -> bool {
    matches!(
        (from, to),
        (PollStatus::Open, PollStatus::Closed)
            | (PollStatus::Open, PollStatus::Finalized)
            | (PollStatus::Closed, PollStatus::Finalized)
    )
}

/// Validate a status transition, returning `BadRequest` when disallowed.
pub fn ensure_transition(from: PollStatus, to: PollStatus) -> AppResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Poll cannot move from {from:?} to {to:?}"
        )))
    }
}
