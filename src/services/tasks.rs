use std::future::Future;
use std::sync::Arc;

use futures::future;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Task, TaskInput, TaskStatus, TaskUpdate};
use crate::repository::TaskRepository;

/// Ownership policy: only the owner may touch a task.
pub fn ensure_owner(task: &Task, requester_id: i32) -> AppResult<()> {
    if task.owner_id == requester_id {
        Ok(())
    } else {
        log::warn!(
            "User {} denied access to task {} owned by {}",
            requester_id,
            task.id,
            task.owner_id
        );
        Err(AppError::AccessForbidden(
            "You do not have permission to access this task".into(),
        ))
    }
}

/// Task CRUD scoped to the requesting user.
#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    /// Creates a pending task owned by `owner_id`.
    pub async fn create(&self, owner_id: i32, input: TaskInput) -> AppResult<Task> {
        let task = self.repo.create(Task::new(input, owner_id)).await?;
        log::info!("User {} created task {}", owner_id, task.id);
        Ok(task)
    }

    /// All of the owner's tasks, optionally only those with `status`. An empty list
    /// is a normal result.
    pub async fn list_for_owner(
        &self,
        owner_id: i32,
        status: Option<TaskStatus>,
    ) -> AppResult<Vec<Task>> {
        Ok(self.repo.list_for_owner(owner_id, status).await?)
    }

    pub async fn get(&self, task_id: Uuid, owner_id: i32) -> AppResult<Task> {
        self.with_owned_task(task_id, owner_id, |task| future::ready(Ok(task)))
            .await
    }

    pub async fn update(
        &self,
        task_id: Uuid,
        owner_id: i32,
        changes: TaskUpdate,
    ) -> AppResult<Task> {
        self.with_owned_task(task_id, owner_id, |task| async move {
            if changes.is_empty() {
                return Ok(task);
            }
            Ok(self.repo.update(task.id, changes).await?)
        })
        .await
    }

    pub async fn delete(&self, task_id: Uuid, owner_id: i32) -> AppResult<()> {
        self.with_owned_task(task_id, owner_id, |task| async move {
            self.repo.delete(task.id).await?;
            log::info!("User {} deleted task {}", owner_id, task.id);
            Ok(())
        })
        .await
    }

    /// Fetches the task, checks it belongs to `requester_id`, then runs `action`.
    ///
    /// A missing task is `NotFound`; someone else's task is `AccessForbidden` and
    /// `action` is never called.
    async fn with_owned_task<T, F, Fut>(
        &self,
        task_id: Uuid,
        requester_id: i32,
        action: F,
    ) -> AppResult<T>
    where
        F: FnOnce(Task) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let task = self.repo.find(task_id).await?;
        ensure_owner(&task, requester_id)?;
        action(task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockTaskRepository, RepositoryError};
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    const ALICE: i32 = 1;
    const BOB: i32 = 2;

    fn alice_task() -> Task {
        Task::new(
            TaskInput {
                title: "Buy milk".into(),
                description: None,
            },
            ALICE,
        )
    }

    fn repo_holding(task: Task) -> MockTaskRepository {
        let mut repo = MockTaskRepository::new();
        let id = task.id;
        repo.expect_find()
            .with(eq(id))
            .returning(move |_| Ok(task.clone()));
        repo
    }

    #[actix_rt::test]
    async fn test_create_is_pending_and_owned() {
        let mut repo = MockTaskRepository::new();
        repo.expect_create().returning(Ok);

        let service = TaskService::new(Arc::new(repo));
        let task = service
            .create(
                ALICE,
                TaskInput {
                    title: "Buy milk".into(),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.owner_id, ALICE);
    }

    #[actix_rt::test]
    async fn test_owner_can_read() {
        let task = alice_task();
        let service = TaskService::new(Arc::new(repo_holding(task.clone())));

        assert_eq!(service.get(task.id, ALICE).await.unwrap(), task);
    }

    #[actix_rt::test]
    async fn test_non_owner_is_forbidden_and_nothing_is_mutated() {
        let task = alice_task();
        // Only `find` is expected; a call to update or delete would panic.
        let service = TaskService::new(Arc::new(repo_holding(task.clone())));

        let read = service.get(task.id, BOB).await;
        let update = service
            .update(
                task.id,
                BOB,
                TaskUpdate {
                    title: Some("Hijacked".into()),
                    ..Default::default()
                },
            )
            .await;
        let delete = service.delete(task.id, BOB).await;

        assert!(matches!(read, Err(AppError::AccessForbidden(_))));
        assert!(matches!(update, Err(AppError::AccessForbidden(_))));
        assert!(matches!(delete, Err(AppError::AccessForbidden(_))));
    }

    #[actix_rt::test]
    async fn test_missing_task_is_not_found() {
        let mut repo = MockTaskRepository::new();
        repo.expect_find()
            .returning(|_| Err(RepositoryError::NotFound));
        let service = TaskService::new(Arc::new(repo));

        let result = service.delete(Uuid::new_v4(), ALICE).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_rt::test]
    async fn test_owner_update_forwards_changes() {
        let task = alice_task();
        let mut repo = repo_holding(task.clone());
        let changes = TaskUpdate {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        repo.expect_update()
            .with(eq(task.id), eq(changes.clone()))
            .times(1)
            .returning(|_, changes| {
                let mut task = alice_task();
                changes.apply_to(&mut task);
                Ok(task)
            });

        let service = TaskService::new(Arc::new(repo));
        let updated = service.update(task.id, ALICE, changes).await.unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
    }

    #[actix_rt::test]
    async fn test_empty_update_returns_task_unchanged() {
        let task = alice_task();
        let service = TaskService::new(Arc::new(repo_holding(task.clone())));

        let result = service
            .update(task.id, ALICE, TaskUpdate::default())
            .await
            .unwrap();
        assert_eq!(result, task);
    }

    #[actix_rt::test]
    async fn test_owner_delete() {
        let task = alice_task();
        let mut repo = repo_holding(task.clone());
        repo.expect_delete()
            .with(eq(task.id))
            .times(1)
            .returning(|_| Ok(()));

        let service = TaskService::new(Arc::new(repo));
        assert!(service.delete(task.id, ALICE).await.is_ok());
    }

    #[actix_rt::test]
    async fn test_list_passes_filter() {
        let mut repo = MockTaskRepository::new();
        repo.expect_list_for_owner()
            .with(eq(ALICE), eq(Some(TaskStatus::Done)))
            .returning(|_, _| Ok(vec![]));

        let service = TaskService::new(Arc::new(repo));
        let tasks = service
            .list_for_owner(ALICE, Some(TaskStatus::Done))
            .await
            .unwrap();
        assert!(tasks.is_empty());
    }
}
