//! User service trait definition.

use crate::dto::{RegisterUserRequest, UpdateUserRequest, UserResponse};
use async_trait::async_trait;
use emporium_core::{EmporiumResult, UserId};

/// User service trait.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Registers a new user.
    async fn register(&self, request: RegisterUserRequest) -> EmporiumResult<UserResponse>;

    /// Gets a user by ID.
    async fn get_user(&self, id: UserId) -> EmporiumResult<UserResponse>;

    /// Gets a user by username, reading through the session cache.
    async fn get_by_username(&self, username: &str) -> EmporiumResult<UserResponse>;

    /// Updates a user's profile.
    async fn update_user(
        &self,
        id: UserId,
        request: UpdateUserRequest,
    ) -> EmporiumResult<UserResponse>;

    /// Deletes a user.
    async fn delete_user(&self, id: UserId) -> EmporiumResult<()>;
}
