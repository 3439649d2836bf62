//! User service.
//!
//! Identity is an external concern; this only resolves bearer tokens to
//! users and registers the minimal record other aggregates reference.

use chrono::Utc;
use sea_orm::Set;
use tripcrew_common::{AppError, AppResult, IdGenerator};
use tripcrew_db::{entities::user, repositories::UserRepository};

/// User service for token resolution.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve a bearer token to a user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Register a user and issue an access token.
    pub async fn register(&self, username: &str) -> AppResult<user::Model> {
        let username = username.trim();
        if username.is_empty() || username.len() > 128 {
            return Err(AppError::Validation(
                "Username must be 1-128 characters".to_string(),
            ));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            token: Set(Some(self.id_gen.generate_token())),
            created_at: Set(Utc::now().into()),
        };

        self.user_repo.create(model).await
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }
}
