//! Data access layer for CRUD operations.
//!
//! Every collection is read as a whole snapshot, mutated in memory and written back as a whole
//! snapshot. Writes go through an in-process lock so callers sharing one `DataService` cannot
//! drop each other's changes.

use chrono::Utc;
use tokio::sync::Mutex;

use super::seed::{demo_tasks, demo_users};
use super::storage::Storage;
use crate::config::{Config, CorruptPolicy};
use crate::errors::AppError;
use crate::models::{
    new_id, Collection, Comment, CreateCommentRequest, CreateTaskRequest, CreateUserRequest,
    Entity, Task, UpdateTaskRequest, UpdateUserRequest, User, DEFAULT_PASSWORD,
};

/// Default namespace used by the web client.
pub const DEFAULT_KEY_PREFIX: &str = "intellotask_";

/// Storage keys for the three collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionKeys {
    users: String,
    tasks: String,
    comments: String,
}

impl CollectionKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            users: format!("{}{}", prefix, Collection::Users.as_str()),
            tasks: format!("{}{}", prefix, Collection::Tasks.as_str()),
            comments: format!("{}{}", prefix, Collection::Comments.as_str()),
        }
    }

    pub fn key(&self, collection: Collection) -> &str {
        match collection {
            Collection::Users => &self.users,
            Collection::Tasks => &self.tasks,
            Collection::Comments => &self.comments,
        }
    }
}

impl Default for CollectionKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

/// Entity-scoped CRUD over a key-value storage backend.
pub struct DataService<S: Storage> {
    storage: S,
    keys: CollectionKeys,
    on_corrupt: CorruptPolicy,
    write_lock: Mutex<()>,
}

impl<S: Storage> DataService<S> {
    pub fn new(storage: S) -> Self {
        Self::with_options(storage, CollectionKeys::default(), CorruptPolicy::default())
    }

    pub fn from_config(storage: S, config: &Config) -> Self {
        Self::with_options(
            storage,
            CollectionKeys::with_prefix(&config.key_prefix),
            config.on_corrupt,
        )
    }

    pub fn with_options(storage: S, keys: CollectionKeys, on_corrupt: CorruptPolicy) -> Self {
        Self {
            storage,
            keys,
            on_corrupt,
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn keys(&self) -> &CollectionKeys {
        &self.keys
    }

    /// Seed demo data into every key that has never been written.
    ///
    /// Returns the collections that were seeded; existing keys are left untouched.
    pub async fn initialize(&self) -> Result<Vec<Collection>, AppError> {
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();
        let mut seeded = Vec::new();

        for collection in Collection::ALL {
            let key = self.keys.key(collection);
            if self.storage.get_item(key).await?.is_some() {
                continue;
            }

            let value = match collection {
                Collection::Users => serde_json::to_string(&demo_users(now))?,
                Collection::Tasks => serde_json::to_string(&demo_tasks(now))?,
                Collection::Comments => "[]".to_string(),
            };
            self.storage.set_item(key, &value).await?;
            tracing::info!("Seeded collection {}", key);
            seeded.push(collection);
        }

        Ok(seeded)
    }

    // ==================== USER OPERATIONS ====================

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.load().await
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.find(id).await
    }

    /// First user registered under `email`. Emails are not enforced unique.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .list_users()
            .await?
            .into_iter()
            .find(|user| user.email == email))
    }

    pub async fn add_user(&self, user: &User) -> Result<(), AppError> {
        self.insert(user).await
    }

    /// Build a user from a request and store it.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, AppError> {
        let user = User {
            id: new_id(),
            name: request.name.clone(),
            email: request.email.clone(),
            password: request
                .password
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            role: request.role,
            department: request.department.clone(),
            status: request.status,
            created_at: Utc::now(),
        };

        self.add_user(&user).await?;
        Ok(user)
    }

    /// Replace the stored user with the same id. Returns `false` (and writes nothing) if absent.
    pub async fn update_user(&self, user: &User) -> Result<bool, AppError> {
        Ok(self.modify(user.id(), |_| user.clone()).await?.is_some())
    }

    /// Merge `request` into the stored user.
    pub async fn apply_user_changes(
        &self,
        id: &str,
        request: &UpdateUserRequest,
    ) -> Result<Option<User>, AppError> {
        self.modify(id, |existing| request.apply_to(existing)).await
    }

    /// Delete a user. Tasks and comments referring to it are left in place.
    pub async fn delete_user(&self, id: &str) -> Result<bool, AppError> {
        self.remove::<User>(id).await
    }

    // ==================== TASK OPERATIONS ====================

    /// List all tasks.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        self.load().await
    }

    /// Get a task by ID.
    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, AppError> {
        self.find(id).await
    }

    /// Tasks assigned to `user_id`.
    pub async fn tasks_for_user(&self, user_id: &str) -> Result<Vec<Task>, AppError> {
        Ok(self
            .list_tasks()
            .await?
            .into_iter()
            .filter(|task| task.is_assigned_to(user_id))
            .collect())
    }

    pub async fn add_task(&self, task: &Task) -> Result<(), AppError> {
        self.insert(task).await
    }

    /// Build a task from a request and store it.
    pub async fn create_task(
        &self,
        request: &CreateTaskRequest,
        assigned_by: &str,
    ) -> Result<Task, AppError> {
        let now = Utc::now();
        let task = Task {
            id: new_id(),
            title: request.title.clone(),
            description: request.description.clone(),
            assigned_to: request.assigned_to.clone(),
            assigned_by: assigned_by.to_string(),
            status: request.status,
            priority: request.priority,
            due_date: request.due_date,
            created_at: now,
            updated_at: now,
            attachments: None,
            comments: None,
        };

        self.add_task(&task).await?;
        Ok(task)
    }

    /// Replace the stored task with the same id, stamping a fresh `updated_at` whatever the
    /// caller supplied. Returns `false` (and writes nothing) if absent.
    pub async fn update_task(&self, task: &Task) -> Result<bool, AppError> {
        Ok(self.modify(task.id(), |_| task.clone()).await?.is_some())
    }

    /// Merge `request` into the stored task.
    pub async fn apply_task_changes(
        &self,
        id: &str,
        request: &UpdateTaskRequest,
    ) -> Result<Option<Task>, AppError> {
        self.modify(id, |existing| request.apply_to(existing)).await
    }

    /// Delete a task. Its comments are left in place.
    pub async fn delete_task(&self, id: &str) -> Result<bool, AppError> {
        self.remove::<Task>(id).await
    }

    // ==================== COMMENT OPERATIONS ====================

    /// List all comments.
    pub async fn list_comments(&self) -> Result<Vec<Comment>, AppError> {
        self.load().await
    }

    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        self.find(id).await
    }

    /// Comments attached to `task_id`, in insertion order.
    pub async fn comments_for_task(&self, task_id: &str) -> Result<Vec<Comment>, AppError> {
        Ok(self
            .list_comments()
            .await?
            .into_iter()
            .filter(|comment| comment.task_id == task_id)
            .collect())
    }

    pub async fn add_comment(&self, comment: &Comment) -> Result<(), AppError> {
        self.insert(comment).await
    }

    /// Build a comment by `author` and store it, snapshotting the author's current name.
    pub async fn create_comment(
        &self,
        request: &CreateCommentRequest,
        author: &User,
    ) -> Result<Comment, AppError> {
        let comment = Comment {
            id: new_id(),
            task_id: request.task_id.clone(),
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            content: request.content.clone(),
            created_at: Utc::now(),
        };

        self.add_comment(&comment).await?;
        Ok(comment)
    }

    pub async fn update_comment(&self, comment: &Comment) -> Result<bool, AppError> {
        Ok(self.modify(comment.id(), |_| comment.clone()).await?.is_some())
    }

    pub async fn delete_comment(&self, id: &str) -> Result<bool, AppError> {
        self.remove::<Comment>(id).await
    }

    // ==================== SNAPSHOT PRIMITIVES ====================

    /// Deserialize a whole collection for a read. A key that was never written reads as empty.
    ///
    /// Reads do not hold the write lock, so a reset is handed to `load_locked`, which re-reads
    /// the key under the lock before overwriting it.
    async fn load<T: Entity>(&self) -> Result<Vec<T>, AppError> {
        match self.decode::<T>().await? {
            Ok(items) => Ok(items),
            Err(_) if self.on_corrupt == CorruptPolicy::Reset => {
                let _guard = self.write_lock.lock().await;
                self.load_locked().await
            }
            Err(err) => Err(self.corrupt::<T>(err)),
        }
    }

    /// Like `load`, for callers already holding `write_lock`.
    async fn load_locked<T: Entity>(&self) -> Result<Vec<T>, AppError> {
        match self.decode::<T>().await? {
            Ok(items) => Ok(items),
            Err(err) => match self.on_corrupt {
                CorruptPolicy::Surface => Err(self.corrupt::<T>(err)),
                CorruptPolicy::Reset => {
                    let key = self.keys.key(T::COLLECTION);
                    tracing::warn!("Collection {} is corrupt, resetting to empty: {}", key, err);
                    self.storage.set_item(key, "[]").await?;
                    Ok(Vec::new())
                }
            },
        }
    }

    async fn decode<T: Entity>(&self) -> Result<Result<Vec<T>, serde_json::Error>, AppError> {
        let key = self.keys.key(T::COLLECTION);
        let Some(raw) = self.storage.get_item(key).await? else {
            return Ok(Ok(Vec::new()));
        };
        Ok(serde_json::from_str::<Vec<T>>(&raw))
    }

    fn corrupt<T: Entity>(&self, err: serde_json::Error) -> AppError {
        let key = self.keys.key(T::COLLECTION);
        tracing::error!("Collection {} is corrupt: {}", key, err);
        AppError::CorruptStore {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    async fn save<T: Entity>(&self, items: &[T]) -> Result<(), AppError> {
        let key = self.keys.key(T::COLLECTION);
        let raw = serde_json::to_string(items)?;
        self.storage.set_item(key, &raw).await
    }

    async fn find<T: Entity>(&self, id: &str) -> Result<Option<T>, AppError> {
        Ok(self.load::<T>().await?.into_iter().find(|item| item.id() == id))
    }

    /// Append without a duplicate-id check; callers generate unique ids.
    async fn insert<T: Entity>(&self, item: &T) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load_locked::<T>().await?;
        items.push(item.clone());
        self.save(&items).await?;

        tracing::info!("Added {} to {}", item.id(), T::COLLECTION.as_str());
        Ok(())
    }

    /// Replace the record with `id` by `f(existing)`, touching it first. `None` if absent.
    async fn modify<T, F>(&self, id: &str, f: F) -> Result<Option<T>, AppError>
    where
        T: Entity,
        F: FnOnce(&T) -> T,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load_locked::<T>().await?;

        let Some(index) = items.iter().position(|item| item.id() == id) else {
            tracing::debug!("Update of missing {} {} ignored", T::COLLECTION.as_str(), id);
            return Ok(None);
        };

        let mut updated = f(&items[index]);
        updated.touch(&items[index], Utc::now());
        items[index] = updated.clone();
        self.save(&items).await?;

        tracing::info!("Updated {} in {}", id, T::COLLECTION.as_str());
        Ok(Some(updated))
    }

    /// Filter out `id`. Returns whether anything was removed; a miss writes nothing.
    async fn remove<T: Entity>(&self, id: &str) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load_locked::<T>().await?;
        let before = items.len();
        items.retain(|item| item.id() != id);

        if items.len() == before {
            tracing::debug!("Delete of missing {} {} ignored", T::COLLECTION.as_str(), id);
            return Ok(false);
        }

        self.save(&items).await?;
        tracing::info!("Deleted {} from {}", id, T::COLLECTION.as_str());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;
    use crate::models::{TaskPriority, TaskStatus};
    use chrono::NaiveDate;

    async fn seeded() -> DataService<MemoryStorage> {
        let service = DataService::new(MemoryStorage::new());
        service.initialize().await.unwrap();
        service
    }

    fn task_request(assigned_to: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: "Quarterly Review".to_string(),
            description: "Prepare the quarterly review deck".to_string(),
            assigned_to: assigned_to.to_string(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Low,
            due_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let service = DataService::new(MemoryStorage::new());
        assert!(service.list_users().await.unwrap().is_empty());
        assert!(service.list_tasks().await.unwrap().is_empty());
        assert!(service.list_comments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_seeds_once() {
        let service = DataService::new(MemoryStorage::new());
        let seeded = service.initialize().await.unwrap();
        assert_eq!(seeded, Collection::ALL.to_vec());

        assert_eq!(service.list_users().await.unwrap().len(), 3);
        assert_eq!(service.list_tasks().await.unwrap().len(), 3);
        assert!(service.list_comments().await.unwrap().is_empty());

        service.delete_task("1").await.unwrap();
        let seeded = service.initialize().await.unwrap();
        assert!(seeded.is_empty());
        assert_eq!(service.list_tasks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_initialize_only_fills_missing_keys() {
        let storage = MemoryStorage::new().with_item("intellotask_tasks", "[]");
        let service = DataService::new(storage);

        let seeded = service.initialize().await.unwrap();
        assert_eq!(seeded, vec![Collection::Users, Collection::Comments]);
        assert!(service.list_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let keys = CollectionKeys::with_prefix("demo_");
        assert_eq!(keys.key(Collection::Tasks), "demo_tasks");

        let service =
            DataService::with_options(MemoryStorage::new(), keys, CorruptPolicy::Surface);
        service.initialize().await.unwrap();
        assert!(service.storage().get_item("demo_users").await.unwrap().is_some());
        assert!(service
            .storage()
            .get_item("intellotask_users")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_add_then_list_contains_exactly_one() {
        let service = seeded().await;
        let task = service.create_task(&task_request("3"), "1").await.unwrap();

        let tasks = service.list_tasks().await.unwrap();
        let matching: Vec<_> = tasks.iter().filter(|t| t.id == task.id).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0], &task);
        assert_eq!(service.get_task(&task.id).await.unwrap(), Some(task));
    }

    #[tokio::test]
    async fn test_generated_ids_are_unique() {
        let service = DataService::new(MemoryStorage::new());
        for _ in 0..20 {
            service.create_task(&task_request("2"), "1").await.unwrap();
        }
        let mut ids: Vec<_> = service
            .list_tasks()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn test_update_task_stamps_updated_at() {
        let service = seeded().await;
        let mut task = service.get_task("1").await.unwrap().unwrap();
        let previous = task.updated_at;

        task.status = TaskStatus::Completed;
        task.updated_at = previous - chrono::Duration::days(30);
        assert!(service.update_task(&task).await.unwrap());

        let stored = service.get_task("1").await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Completed);
        assert!(stored.updated_at >= previous);
    }

    #[tokio::test]
    async fn test_update_missing_is_noop() {
        let service = seeded().await;
        let before = service.list_tasks().await.unwrap();

        let mut ghost = before[0].clone();
        ghost.id = "does-not-exist".to_string();
        assert!(!service.update_task(&ghost).await.unwrap());
        assert!(service
            .apply_task_changes("does-not-exist", &UpdateTaskRequest::default())
            .await
            .unwrap()
            .is_none());

        assert_eq!(service.list_tasks().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = seeded().await;
        assert!(service.delete_task("2").await.unwrap());
        let once = service.list_tasks().await.unwrap();

        assert!(!service.delete_task("2").await.unwrap());
        assert_eq!(service.list_tasks().await.unwrap(), once);
        assert_eq!(once.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_user_does_not_cascade() {
        let service = seeded().await;
        assert_eq!(service.tasks_for_user("2").await.unwrap().len(), 2);

        service.delete_user("2").await.unwrap();

        let orphaned = service.tasks_for_user("2").await.unwrap();
        assert_eq!(orphaned.len(), 2);
        assert!(service.get_user("2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_lookup_by_email_and_changes() {
        let service = seeded().await;
        let john = service
            .get_user_by_email("john@intellotask.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(john.id, "2");

        let updated = service
            .apply_user_changes(
                "2",
                &UpdateUserRequest {
                    department: Some("Platform".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.department.as_deref(), Some("Platform"));
        assert_eq!(updated.email, john.email);
        assert!(service.get_user_by_email("nobody@x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_user_defaults_password() {
        let service = DataService::new(MemoryStorage::new());
        let user = service
            .create_user(&CreateUserRequest {
                name: "Mia Wong".to_string(),
                email: "mia@intellotask.com".to_string(),
                password: None,
                role: crate::models::Role::Employee,
                department: None,
                status: crate::models::UserStatus::Active,
            })
            .await
            .unwrap();
        assert_eq!(user.password, DEFAULT_PASSWORD);
        assert_eq!(service.list_users().await.unwrap(), vec![user]);
    }

    #[tokio::test]
    async fn test_comments_by_task() {
        let service = seeded().await;
        let author = service.get_user("2").await.unwrap().unwrap();

        let first = service
            .create_comment(
                &CreateCommentRequest {
                    task_id: "1".to_string(),
                    content: "Wireframes are up".to_string(),
                },
                &author,
            )
            .await
            .unwrap();
        service
            .create_comment(
                &CreateCommentRequest {
                    task_id: "3".to_string(),
                    content: "Indexes added".to_string(),
                },
                &author,
            )
            .await
            .unwrap();

        let on_first = service.comments_for_task("1").await.unwrap();
        assert_eq!(on_first, vec![first.clone()]);
        assert_eq!(first.user_name, "John Smith");

        service.delete_task("1").await.unwrap();
        assert_eq!(service.comments_for_task("1").await.unwrap().len(), 1);

        assert!(service.delete_comment(&first.id).await.unwrap());
        assert!(service.get_comment(&first.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_comment() {
        let service = seeded().await;
        let author = service.get_user("3").await.unwrap().unwrap();
        let comment = service
            .create_comment(
                &CreateCommentRequest {
                    task_id: "3".to_string(),
                    content: "Schema draft attached".to_string(),
                },
                &author,
            )
            .await
            .unwrap();

        let edited = Comment {
            content: "Schema draft v2 attached".to_string(),
            ..comment.clone()
        };
        assert!(service.update_comment(&edited).await.unwrap());
        let stored = service.get_comment(&comment.id).await.unwrap().unwrap();
        assert_eq!(stored.content, "Schema draft v2 attached");
        assert_eq!(stored.created_at, comment.created_at);

        let missing = Comment {
            id: "missing".to_string(),
            ..edited
        };
        assert!(!service.update_comment(&missing).await.unwrap());
        assert_eq!(service.list_comments().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_collection_surfaces_error() {
        let storage = MemoryStorage::new().with_item("intellotask_tasks", "{not json");
        let service = DataService::new(storage);

        let err = service.list_tasks().await.unwrap_err();
        assert!(matches!(err, AppError::CorruptStore { ref key, .. } if key == "intellotask_tasks"));

        // Writes fail too, and the stored value is left for inspection.
        assert!(service.create_task(&task_request("2"), "1").await.is_err());
        assert_eq!(
            service
                .storage()
                .get_item("intellotask_tasks")
                .await
                .unwrap()
                .as_deref(),
            Some("{not json")
        );
    }

    #[tokio::test]
    async fn test_corrupt_collection_reset_policy() {
        let storage = MemoryStorage::new().with_item("intellotask_users", "[{\"id\":");
        let service =
            DataService::with_options(storage, CollectionKeys::default(), CorruptPolicy::Reset);

        assert!(service.list_users().await.unwrap().is_empty());
        assert_eq!(
            service
                .storage()
                .get_item("intellotask_users")
                .await
                .unwrap()
                .as_deref(),
            Some("[]")
        );
    }

    /// Memory storage that yields to the scheduler after every read.
    struct YieldingStorage {
        inner: MemoryStorage,
        yields: usize,
    }

    impl Storage for YieldingStorage {
        async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
            let value = self.inner.get_item(key).await?;
            for _ in 0..self.yields {
                tokio::task::yield_now().await;
            }
            Ok(value)
        }

        async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
            self.inner.set_item(key, value).await
        }

        async fn remove_item(&self, key: &str) -> Result<(), AppError> {
            self.inner.remove_item(key).await
        }
    }

    #[tokio::test]
    async fn test_reset_during_read_keeps_concurrent_insert() {
        let storage = YieldingStorage {
            inner: MemoryStorage::new().with_item("intellotask_tasks", "{corrupt"),
            yields: 20,
        };
        let service =
            DataService::with_options(storage, CollectionKeys::default(), CorruptPolicy::Reset);

        let request = task_request("2");
        let (listed, created) = tokio::join!(
            service.list_tasks(),
            service.create_task(&request, "1")
        );
        listed.unwrap();
        let created = created.unwrap();

        let stored = service.list_tasks().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, created.id);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_are_not_lost() {
        let service = std::sync::Arc::new(DataService::new(MemoryStorage::new()));
        let mut handles = Vec::new();
        for i in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                let mut request = task_request("2");
                request.title = format!("Task {}", i);
                service.create_task(&request, "1").await.map(|_| ())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(service.list_tasks().await.unwrap().len(), 16);
    }
}
