//! In-process store implementing both repository traits.
//!
//! Used by the integration tests and for running the server without Postgres. A
//! single `RwLock` guards users and tasks together, which gives the same guarantees
//! the SQL schema provides: unique usernames and emails checked atomically with the
//! insert, and tasks removed together with their owner.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::models::{NewUser, Task, TaskStatus, TaskUpdate, User, UserChanges, UserLookup};

#[derive(Default)]
struct State {
    users: BTreeMap<i32, User>,
    tasks: HashMap<Uuid, Task>,
    last_user_id: i32,
}

impl State {
    fn conflicts(&self, username: Option<&str>, email: Option<&str>, except: Option<i32>) -> bool {
        self.users.values().any(|user| {
            Some(user.id) != except
                && (username == Some(user.username.as_str()) || email == Some(user.email.as_str()))
        })
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn task_count(&self) -> usize {
        self.state.read().await.tasks.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let mut state = self.state.write().await;
        if state.conflicts(Some(&user.username), Some(&user.email), None) {
            return Err(RepositoryError::AlreadyExists);
        }

        state.last_user_id += 1;
        let created = User {
            id: state.last_user_id,
            username: user.username,
            email: user.email,
            hashed_password: user.hashed_password,
            created_at: Utc::now(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find(&self, lookup: UserLookup) -> RepositoryResult<User> {
        let state = self.state.read().await;
        let found = match &lookup {
            UserLookup::Id(id) => state.users.get(id),
            UserLookup::Username(username) => {
                state.users.values().find(|u| &u.username == username)
            }
            UserLookup::Email(email) => state.users.values().find(|u| &u.email == email),
        };
        found.cloned().ok_or(RepositoryError::NotFound)
    }

    async fn list(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<User>> {
        let limit = usize::try_from(limit).map_err(|e| RepositoryError::Storage(e.to_string()))?;
        let offset =
            usize::try_from(offset).map_err(|e| RepositoryError::Storage(e.to_string()))?;

        let state = self.state.read().await;
        Ok(state.users.values().skip(offset).take(limit).cloned().collect())
    }

    async fn update(&self, id: i32, changes: UserChanges) -> RepositoryResult<User> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if state.conflicts(changes.username.as_deref(), changes.email.as_deref(), Some(id)) {
            return Err(RepositoryError::AlreadyExists);
        }

        let user = state.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hashed_password) = changes.hashed_password {
            user.hashed_password = hashed_password;
        }
        Ok(user.clone())
    }

    async fn delete(&self, id: i32) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        state.users.remove(&id).ok_or(RepositoryError::NotFound)?;
        state.tasks.retain(|_, task| task.owner_id != id);
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn create(&self, task: Task) -> RepositoryResult<Task> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&task.owner_id) {
            return Err(RepositoryError::NotFound);
        }
        if state.tasks.contains_key(&task.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find(&self, id: Uuid) -> RepositoryResult<Task> {
        let state = self.state.read().await;
        state.tasks.get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn list_for_owner(
        &self,
        owner_id: i32,
        status: Option<TaskStatus>,
    ) -> RepositoryResult<Vec<Task>> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.owner_id == owner_id)
            .filter(|task| status.map_or(true, |status| task.status == status))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update(&self, id: Uuid, changes: TaskUpdate) -> RepositoryResult<Task> {
        let mut state = self.state.write().await;
        let task = state.tasks.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        changes.apply_to(task);
        Ok(task.clone())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
