//! Persistence contract for users and tasks.
//!
//! Services only ever talk to these traits. Implementations translate whatever the
//! backing store reports into [`RepositoryError`], so no driver error type crosses
//! this boundary.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUser, Task, TaskStatus, TaskUpdate, User, UserChanges, UserLookup};

pub use memory::InMemoryStore;
pub use postgres::{PgTaskRepository, PgUserRepository};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("record violates a uniqueness constraint")]
    AlreadyExists,
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user. Fails with `AlreadyExists` if the username or email is taken,
    /// in which case nothing is stored.
    async fn create(&self, user: NewUser) -> RepositoryResult<User>;

    async fn find(&self, lookup: UserLookup) -> RepositoryResult<User>;

    async fn list(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<User>>;

    async fn update(&self, id: i32, changes: UserChanges) -> RepositoryResult<User>;

    /// Removes the user and every task they own.
    async fn delete(&self, id: i32) -> RepositoryResult<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a task. Fails with `NotFound` if the owner does not exist.
    async fn create(&self, task: Task) -> RepositoryResult<Task>;

    async fn find(&self, id: Uuid) -> RepositoryResult<Task>;

    async fn list_for_owner(
        &self,
        owner_id: i32,
        status: Option<TaskStatus>,
    ) -> RepositoryResult<Vec<Task>>;

    async fn update(&self, id: Uuid, changes: TaskUpdate) -> RepositoryResult<Task>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
