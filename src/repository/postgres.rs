//! Postgres-backed repositories built on `sqlx`.
//!
//! Queries are checked at runtime (`query_as`), so building the crate does not need
//! a live database. The schema lives in `migrations/`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::models::{NewUser, Task, TaskStatus, TaskUpdate, User, UserChanges, UserLookup};

const USER_COLUMNS: &str = "id, username, email, hashed_password, created_at";
const TASK_COLUMNS: &str = "id, title, description, status, owner_id, created_at, updated_at";

/// Converts `sqlx::Error` into `RepositoryError`.
///
/// Unique violations become `AlreadyExists`; missing rows and dangling foreign keys
/// become `NotFound`. Everything else is an opaque storage failure.
impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::AlreadyExists
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            _ => RepositoryError::Storage(error.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let sql = format!(
            "INSERT INTO users (username, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(user.username)
            .bind(user.email)
            .bind(user.hashed_password)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find(&self, lookup: UserLookup) -> RepositoryResult<User> {
        let query = match &lookup {
            UserLookup::Id(_) => format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"),
            UserLookup::Username(_) => {
                format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1")
            }
            UserLookup::Email(_) => format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"),
        };

        let builder = sqlx::query_as::<_, User>(&query);
        let builder = match lookup {
            UserLookup::Id(id) => builder.bind(id),
            UserLookup::Username(username) => builder.bind(username),
            UserLookup::Email(email) => builder.bind(email),
        };

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn list(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2");
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> RepositoryResult<User> {
        let sql = format!(
            "UPDATE users SET \
                 username = COALESCE($2, username), \
                 email = COALESCE($3, email), \
                 hashed_password = COALESCE($4, hashed_password) \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.username)
            .bind(changes.email)
            .bind(changes.hashed_password)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: i32) -> RepositoryResult<()> {
        // Owned tasks go with the row through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: Task) -> RepositoryResult<Task> {
        let sql = format!(
            "INSERT INTO tasks (id, title, description, status, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {TASK_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(task.title)
            .bind(task.description)
            .bind(task.status)
            .bind(task.owner_id)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find(&self, id: Uuid) -> RepositoryResult<Task> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_for_owner(
        &self,
        owner_id: i32,
        status: Option<TaskStatus>,
    ) -> RepositoryResult<Vec<Task>> {
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1");
        if status.is_some() {
            sql.push_str(" AND status = $2");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(owner_id);
        if let Some(status) = status {
            query_builder = query_builder.bind(status);
        }

        let tasks = query_builder.fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn update(&self, id: Uuid, changes: TaskUpdate) -> RepositoryResult<Task> {
        // $3 flags whether description was present at all, so that NULL in $4 can
        // mean "clear" rather than "leave alone".
        let sql = format!(
            "UPDATE tasks SET \
                 title = COALESCE($2, title), \
                 description = CASE WHEN $3::BOOLEAN THEN $4::TEXT ELSE description END, \
                 status = COALESCE($5, status), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {TASK_COLUMNS}"
        );
        let description_present = changes.description.is_some();
        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(description_present)
            .bind(changes.description.flatten())
            .bind(changes.status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
