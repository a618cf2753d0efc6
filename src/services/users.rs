use std::sync::Arc;

use crate::auth::CredentialService;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserChanges, UserInput, UserLookup, UserUpdate};
use crate::repository::UserRepository;

/// User profile CRUD.
///
/// Updates and deletes take any id: there is no per-caller check on who may edit
/// which profile.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    credentials: CredentialService,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, credentials: CredentialService) -> Self {
        Self { repo, credentials }
    }

    /// Hashes the password and stores the user. A taken username or email surfaces
    /// as `AlreadyExists`.
    pub async fn create(&self, input: UserInput) -> AppResult<User> {
        let hashed_password = self.credentials.hash(&input.password)?;
        let user = self
            .repo
            .create(NewUser {
                username: input.username,
                email: input.email,
                hashed_password,
            })
            .await?;

        log::info!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.find(UserLookup::Id(id)).await
    }

    pub async fn find(&self, lookup: UserLookup) -> AppResult<User> {
        Ok(self.repo.find(lookup).await?)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<User>> {
        if limit < 0 || offset < 0 {
            return Err(AppError::Validation(
                "Pagination limit and offset must be non-negative".into(),
            ));
        }
        Ok(self.repo.list(limit, offset).await?)
    }

    /// Applies only the provided fields. A new password is hashed before storage.
    pub async fn update(&self, id: i32, update: UserUpdate) -> AppResult<User> {
        let hashed_password = update
            .password
            .as_deref()
            .map(|password| self.credentials.hash(password))
            .transpose()?;

        let changes = UserChanges {
            username: update.username,
            email: update.email,
            hashed_password,
        };
        let user = self.repo.update(id, changes).await?;

        log::info!("Updated user {}", user.id);
        Ok(user)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repo.delete(id).await?;
        log::info!("Deleted user {} and their tasks", id);
        Ok(())
    }
}
