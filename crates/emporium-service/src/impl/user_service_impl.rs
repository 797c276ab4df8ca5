//! User service implementation.

use crate::cache::CacheFacade;
use crate::dto::{RegisterUserRequest, UpdateUserRequest, UserResponse};
use crate::user_service::UserService;
use async_trait::async_trait;
use emporium_core::{Email, EmporiumError, EmporiumResult, User, UserId, ValidateExt};
use emporium_repository::UserRepository;
use std::sync::Arc;
use tracing::{debug, info};

/// User service backed by a `UserRepository`.
pub struct UserServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    cache: CacheFacade,
}

impl UserServiceImpl {
    pub fn new(user_repository: Arc<dyn UserRepository>, cache: CacheFacade) -> Self {
        Self {
            user_repository,
            cache,
        }
    }

    async fn find_user(&self, id: UserId) -> EmporiumResult<User> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| EmporiumError::not_found("User", id))
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn register(&self, request: RegisterUserRequest) -> EmporiumResult<UserResponse> {
        debug!("Registering user: {}", request.username);

        request.validate_request()?;

        let email =
            Email::new(&request.email).map_err(|e| EmporiumError::Validation(e.to_string()))?;

        if self
            .user_repository
            .exists_by_username(&request.username)
            .await?
        {
            return Err(EmporiumError::Conflict(format!(
                "Username '{}' already exists",
                request.username
            )));
        }

        if self.user_repository.exists_by_email(email.as_str()).await? {
            return Err(EmporiumError::Conflict(format!(
                "Email '{}' already exists",
                email
            )));
        }

        let user = User::new(request.username, email, request.role);
        let saved = self.user_repository.save(&user).await?;

        info!("User registered: {}", saved.id);
        Ok(UserResponse::from(saved))
    }

    async fn get_user(&self, id: UserId) -> EmporiumResult<UserResponse> {
        debug!("Getting user: {}", id);
        Ok(UserResponse::from(self.find_user(id).await?))
    }

    async fn get_by_username(&self, username: &str) -> EmporiumResult<UserResponse> {
        debug!("Getting user by username: {}", username);

        let users = Arc::clone(&self.user_repository);
        let name = username.to_string();
        let user = self
            .cache
            .session(username, || async move {
                users
                    .find_by_username(&name)
                    .await?
                    .ok_or_else(|| EmporiumError::not_found("User", name))
            })
            .await?;

        Ok(UserResponse::from(user))
    }

    async fn update_user(
        &self,
        id: UserId,
        request: UpdateUserRequest,
    ) -> EmporiumResult<UserResponse> {
        debug!("Updating user: {}", id);

        request.validate_request()?;

        let mut user = self.find_user(id).await?;

        if let Some(raw) = request.email {
            let email = Email::new(raw).map_err(|e| EmporiumError::Validation(e.to_string()))?;
            if email != user.email && self.user_repository.exists_by_email(email.as_str()).await? {
                return Err(EmporiumError::Conflict(format!(
                    "Email '{}' already exists",
                    email
                )));
            }
            user.email = email;
        }
        if let Some(role) = request.role {
            user.role = role;
        }
        user.touch();

        let updated = self.user_repository.update(&user).await?;
        self.cache.invalidate_user_session(&updated.username).await;

        info!("User updated: {}", id);
        Ok(UserResponse::from(updated))
    }

    async fn delete_user(&self, id: UserId) -> EmporiumResult<()> {
        debug!("Deleting user: {}", id);

        let user = self.find_user(id).await?;
        self.user_repository.delete(id).await?;

        self.cache.invalidate_user_session(&user.username).await;
        self.cache.invalidate_cart_cache(id).await;

        info!("User deleted: {}", id);
        Ok(())
    }
}
