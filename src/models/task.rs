use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Done,
}

/// Input structure for creating a task.
///
/// There is no status field: new tasks always start as [`TaskStatus::Pending`].
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task.
    /// Must be between 1 and 255 characters and not only whitespace.
    #[validate(length(min = 1, max = 255), custom = "not_blank")]
    pub title: String,

    /// An optional description for the task.
    pub description: Option<String>,
}

/// Partial update for a task.
///
/// A field that is omitted from the payload is left as is. For `description`, an
/// explicit `null` clears the stored value, which is why it is a nested option:
/// `None` means omitted, `Some(None)` means clear, `Some(Some(_))` means set.
/// `title` and `status` are not nullable, so `null` for them counts as omitted.
#[derive(Debug, Default, Clone, Deserialize, Validate, PartialEq, Eq)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 255), custom = "not_blank")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "deserialize_explicit_null")]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Wraps any present value (including `null`) in `Some`, so that a missing field,
/// which serde fills through `default`, stays distinguishable from `null`.
fn deserialize_explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
    /// The current status of the task.
    pub status: TaskStatus,
    /// Identifier of the user who owns the task.
    pub owner_id: i32,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

/// Represents query parameters for filtering tasks when listing them.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Filter tasks by status.
    pub status: Option<TaskStatus>,
}

impl Task {
    /// Creates a new pending `Task` owned by `owner_id`.
    pub fn new(input: TaskInput, owner_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: TaskStatus::Pending,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }

    /// Applies the provided fields to `task`, leaving the others untouched.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        task.updated_at = Utc::now();
    }
}
