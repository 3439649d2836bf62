//! Group service.
//!
//! Minimal membership administration so the membership oracle has rows to
//! answer from. Richer group management is outside this core.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tripcrew_common::{AppError, AppResult, IdGenerator};
use tripcrew_db::entities::group_member::GroupRole;
use tripcrew_db::entities::{group, group_member};
use tripcrew_db::repositories::GroupRepository;
use validator::Validate;

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

/// Input for adding a member to a group.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberInput {
    pub group_id: String,
    pub user_id: String,
    #[serde(default)]
    pub role: GroupRole,
}

/// Service for managing groups and their members.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a group by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_id(id).await
    }

    /// Create a group. The creator becomes its first active leader.
    pub async fn create(&self, user_id: &str, input: CreateGroupInput) -> AppResult<group::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let now = Utc::now();
        let group_id = self.id_gen.generate();

        let model = group::ActiveModel {
            id: Set(group_id.clone()),
            name: Set(input.name),
            created_by: Set(user_id.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let created = self.group_repo.create(model).await?;

        let member = group_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(group_id),
            user_id: Set(user_id.to_string()),
            role: Set(GroupRole::Leader),
            is_active: Set(true),
            joined_at: Set(now.into()),
        };
        self.group_repo.add_member(member).await?;

        Ok(created)
    }

    /// Add a member. Leader only.
    pub async fn add_member(
        &self,
        actor_id: &str,
        input: AddMemberInput,
    ) -> AppResult<group_member::Model> {
        self.group_repo.get_by_id(&input.group_id).await?;

        if !self.group_repo.is_leader(&input.group_id, actor_id).await? {
            return Err(AppError::Forbidden(
                "Only a group leader can add members".to_string(),
            ));
        }

        if self
            .group_repo
            .get_member(&input.group_id, &input.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("User is already a member".to_string()));
        }

        let member = group_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(input.group_id),
            user_id: Set(input.user_id),
            role: Set(input.role),
            is_active: Set(true),
            joined_at: Set(Utc::now().into()),
        };

        self.group_repo.add_member(member).await
    }

    /// List members of a group. Member only.
    pub async fn list_members(
        &self,
        actor_id: &str,
        group_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group_member::Model>> {
        if !self.group_repo.is_active_member(group_id, actor_id).await? {
            return Err(AppError::Forbidden(
                "Not an active member of this group".to_string(),
            ));
        }

        self.group_repo.list_members(group_id, limit, offset).await
    }
}
