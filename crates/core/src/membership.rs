//! Membership oracle port.
//!
//! Every mutating operation asks one question before touching state: is the
//! caller an active member (or leader) of the owning group? The trait keeps
//! that question behind a seam so services stay testable without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use tripcrew_common::AppResult;
use tripcrew_db::repositories::GroupRepository;

/// Answers membership and leadership questions for a group.
#[async_trait]
pub trait MembershipGate: Send + Sync {
    /// Is the user an active member of the group?
    async fn is_active_member(&self, group_id: &str, user_id: &str) -> AppResult<bool>;

    /// Is the user an active leader of the group?
    async fn is_leader(&self, group_id: &str, user_id: &str) -> AppResult<bool>;
}

/// Production adapter backed by the group member table.
#[derive(Clone)]
pub struct DbMembershipGate {
    group_repo: GroupRepository,
}

impl DbMembershipGate {
    /// Create a new database-backed membership gate.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self { group_repo }
    }
}

#[async_trait]
impl MembershipGate for DbMembershipGate {
    async fn is_active_member(&self, group_id: &str, user_id: &str) -> AppResult<bool> {
        self.group_repo.is_active_member(group_id, user_id).await
    }

    async fn is_leader(&self, group_id: &str, user_id: &str) -> AppResult<bool> {
        self.group_repo.is_leader(group_id, user_id).await
    }
}

/// In-memory membership table for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMembership {
    // (group_id, user_id) -> (is_leader, is_active)
    entries: HashMap<(String, String), (bool, bool)>,
}

impl InMemoryMembership {
    /// Create an empty membership table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an active member.
    #[must_use]
    pub fn with_member(mut self, group_id: &str, user_id: &str) -> Self {
        self.entries
            .insert((group_id.to_string(), user_id.to_string()), (false, true));
        self
    }

    /// Add an active leader.
    #[must_use]
    pub fn with_leader(mut self, group_id: &str, user_id: &str) -> Self {
        self.entries
            .insert((group_id.to_string(), user_id.to_string()), (true, true));
        self
    }

    /// Add an inactive member (keeps the row, loses all capabilities).
    #[must_use]
    pub fn with_inactive(mut self, group_id: &str, user_id: &str) -> Self {
        self.entries
            .insert((group_id.to_string(), user_id.to_string()), (false, false));
        self
    }
}

#[async_trait]
impl MembershipGate for InMemoryMembership {
    async fn is_active_member(&self, group_id: &str, user_id: &str) -> AppResult<bool> {
        Ok(self
            .entries
            .get(&(group_id.to_string(), user_id.to_string()))
            .is_some_and(|(_, active)| *active))
    }

    async fn is_leader(&self, group_id: &str, user_id: &str) -> AppResult<bool> {
        Ok(self
            .entries
            .get(&(group_id.to_string(), user_id.to_string()))
            .is_some_and(|(leader, active)| *leader && *active))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_membership() {
        let gate = InMemoryMembership::new()
            .with_member("g1", "u1")
            .with_leader("g1", "u2")
            .with_inactive("g1", "u3");

        assert!(gate.is_active_member("g1", "u1").await.unwrap());
        assert!(!gate.is_leader("g1", "u1").await.unwrap());

        assert!(gate.is_active_member("g1", "u2").await.unwrap());
        assert!(gate.is_leader("g1", "u2").await.unwrap());

        // Inactive members lose everything
        assert!(!gate.is_active_member("g1", "u3").await.unwrap());
        assert!(!gate.is_leader("g1", "u3").await.unwrap());

        // Unknown users are not members
        assert!(!gate.is_active_member("g1", "u9").await.unwrap());
    }
}
