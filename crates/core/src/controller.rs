//! Task state controller
//!
//! Owns the collection cache and the selection of one mounted view, derives
//! the visible page, and runs create/update/delete against the remote API.
//!
//! Lifecycle: `new` → `load` → any number of mutations → `dispose`. After
//! `dispose` every operation fails with [`Error::Cancelled`] and results of
//! requests still in flight are dropped instead of being applied.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::CollectionCache;
use crate::notify::{Notification, Notifier};
use crate::remote::TaskApi;
use crate::selection::{Route, Selection};
use crate::single_flight::{FlightKey, SingleFlight};
use crate::task::{Task, TaskInput, TaskStatus};
use crate::user::{self, User};
use crate::view::{self, PageParams, PageSize, SortOrder, TaskPage};
use crate::{Error, Result};

/// Result of a successful mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome<T> {
    pub value: T,
    /// Navigation intent for the front end
    pub next: Route,
}

/// A task together with its responsible user, if known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetail {
    pub task: Task,
    pub user: Option<User>,
}

impl TaskDetail {
    pub fn responsible_name(&self) -> &str {
        self.user
            .as_ref()
            .map_or(user::USER_NOT_FOUND, |u| u.name.as_str())
    }

    pub fn responsible_email(&self) -> &str {
        self.user
            .as_ref()
            .map_or(user::EMAIL_NOT_FOUND, |u| u.email.as_str())
    }
}

/// A failed fetch and where the front end should go instead
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct Redirect {
    pub error: Error,
    pub next: Route,
}

impl From<Redirect> for Error {
    fn from(redirect: Redirect) -> Self {
        redirect.error
    }
}

/// Pre-filled edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub task_id: i64,
    pub input: TaskInput,
    /// Choices for the responsible user
    pub users: Vec<User>,
}

pub struct TaskController {
    api: Arc<dyn TaskApi>,
    notifier: Arc<dyn Notifier>,
    cache: RwLock<CollectionCache>,
    selection: RwLock<Selection>,
    sort: RwLock<SortOrder>,
    status_filter: Option<TaskStatus>,
    flights: SingleFlight,
    cancel: CancellationToken,
}

impl TaskController {
    /// Controller for the full task list
    pub fn new(api: Arc<dyn TaskApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            cache: RwLock::new(CollectionCache::default()),
            selection: RwLock::new(Selection::default()),
            sort: RwLock::new(SortOrder::default()),
            status_filter: None,
            flights: SingleFlight::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Controller for the list of completed tasks
    pub fn completed(api: Arc<dyn TaskApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(api, notifier).with_status_filter(TaskStatus::Completed)
    }

    /// Only keep tasks with this status in the cache
    pub fn with_status_filter(mut self, status: TaskStatus) -> Self {
        self.status_filter = Some(status);
        self
    }

    /// Start with a page size other than the default
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.cache = RwLock::new(CollectionCache::new(page_size));
        self
    }

    pub fn status_filter(&self) -> Option<&TaskStatus> {
        self.status_filter.as_ref()
    }

    /// Route of the list this controller backs
    pub fn home_route(&self) -> Route {
        match self.status_filter {
            Some(TaskStatus::Completed) => Route::Completed,
            _ => Route::List,
        }
    }

    /// Token cancelled by `dispose`, for collaborators that spawn their own work
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Tear the view down; pending results will be dropped
    pub fn dispose(&self) {
        debug!("Disposing task controller");
        self.cancel.cancel();
    }

    fn ensure_active(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    fn matches_filter(&self, task: &Task) -> bool {
        self.status_filter
            .as_ref()
            .map_or(true, |status| &task.status == status)
    }

    fn report_failure(&self, action: &str, err: &Error) {
        warn!("Failed to {}: {}", action, err);
        self.notifier.notify(Notification::error(format!(
            "Failed to {}: {}",
            action,
            err.user_message()
        )));
    }

    /// Fetch tasks and users concurrently and replace the cache
    ///
    /// Both fetches must succeed; otherwise the cache is left empty and a
    /// "load failed" error is notified. Mutations that complete while the
    /// fetch is in flight are kept, and a load overtaken by a newer one
    /// leaves the cache to it.
    pub async fn load(&self) -> Result<()> {
        self.ensure_active()?;
        let generation = self.cache.write().await.begin_load();

        let result = tokio::try_join!(self.api.list_tasks(), self.api.list_users());

        if self.cancel.is_cancelled() {
            debug!("Dropping load result for disposed controller");
            return Err(Error::Cancelled);
        }

        match result {
            Ok((tasks, users)) => {
                let tasks: Vec<Task> = tasks
                    .into_iter()
                    .filter(|t| self.matches_filter(t))
                    .collect();
                info!(tasks = tasks.len(), users = users.len(), "Loaded task collections");
                if !self.cache.write().await.finish_load(generation, tasks, users) {
                    debug!(generation, "Discarding superseded load result");
                }
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load task collections: {}", e);
                if !self.cache.write().await.fail_load(generation) {
                    debug!(generation, "Load failure superseded by a newer load");
                }
                let err = Error::DataLoadFailed(Box::new(e));
                self.notifier.notify(Notification::error(err.user_message()));
                Err(err)
            }
        }
    }

    pub async fn is_loading(&self) -> bool {
        self.cache.read().await.loading
    }

    /// Copy of the current cache
    pub async fn snapshot(&self) -> CollectionCache {
        self.cache.read().await.clone()
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.cache.read().await.tasks.clone()
    }

    pub async fn users(&self) -> Vec<User> {
        self.cache.read().await.users.clone()
    }

    pub async fn responsible_name(&self, user_id: i64) -> String {
        self.cache.read().await.responsible_name(user_id).to_string()
    }

    pub async fn responsible_email(&self, user_id: i64) -> String {
        self.cache.read().await.responsible_email(user_id).to_string()
    }

    pub async fn sort_order(&self) -> SortOrder {
        *self.sort.read().await
    }

    pub async fn set_sort(&self, order: SortOrder) {
        *self.sort.write().await = order;
    }

    pub async fn page(&self) -> PageParams {
        self.cache.read().await.page
    }

    /// Move to another page or change the page size
    pub async fn set_page(&self, current_page: usize, page_size: usize) -> Result<()> {
        let page = PageParams::new(current_page, page_size)?;
        self.cache.write().await.page = page;
        Ok(())
    }

    pub async fn page_count(&self) -> usize {
        let cache = self.cache.read().await;
        view::page_count(cache.tasks.len(), cache.page.page_size.get())
    }

    /// The visible page under the current sort and page parameters
    pub async fn view(&self) -> TaskPage {
        let order = *self.sort.read().await;
        let cache = self.cache.read().await;
        view::derive_view(
            &cache.tasks,
            order,
            cache.page.current_page,
            cache.page.page_size.get(),
        )
    }

    /// Create a task and append the server's copy to the cache
    pub async fn create(&self, input: &TaskInput) -> Result<MutationOutcome<Task>> {
        self.ensure_active()?;
        let payload = input.validate().inspect_err(|e| self.report_failure("create task", e))?;

        let key = FlightKey::create();
        let _guard = self
            .flights
            .try_acquire(key)
            .ok_or_else(|| Error::Busy(key.to_string()))?;

        let result = self.api.create_task(&payload).await;
        self.ensure_active()?;

        match result {
            Ok(task) => {
                info!(task_id = task.id, "Task created");
                if self.matches_filter(&task) {
                    self.cache.write().await.upsert(task.clone());
                }
                self.notifier.notify(Notification::success("Task created"));
                Ok(MutationOutcome {
                    value: task,
                    next: self.home_route(),
                })
            }
            Err(e) => {
                self.report_failure("create task", &e);
                Err(e)
            }
        }
    }

    /// Update a task and replace the cached record with the server's copy
    pub async fn update(&self, id: i64, input: &TaskInput) -> Result<MutationOutcome<Task>> {
        self.ensure_active()?;
        let payload = input.validate().inspect_err(|e| self.report_failure("update task", e))?;

        let key = FlightKey::update(id);
        let _guard = self
            .flights
            .try_acquire(key)
            .ok_or_else(|| Error::Busy(key.to_string()))?;

        let result = self.api.update_task(id, &payload).await;
        self.ensure_active()?;

        match result {
            Ok(task) => {
                info!(task_id = id, "Task updated");
                {
                    let mut cache = self.cache.write().await;
                    if self.matches_filter(&task) {
                        cache.replace_task(task.clone());
                    } else {
                        cache.remove(id);
                    }
                }
                self.selection.write().await.refresh(&task);
                self.notifier.notify(Notification::success("Task updated"));
                Ok(MutationOutcome {
                    value: task,
                    next: self.home_route(),
                })
            }
            Err(e) => {
                self.report_failure("update task", &e);
                Err(e)
            }
        }
    }

    /// Delete a task; deleting an id the cache does not hold still succeeds
    ///
    /// The value is the removed record, if it was cached.
    pub async fn delete(&self, id: i64) -> Result<MutationOutcome<Option<Task>>> {
        self.ensure_active()?;

        let key = FlightKey::delete(id);
        let _guard = self
            .flights
            .try_acquire(key)
            .ok_or_else(|| Error::Busy(key.to_string()))?;

        let result = self.api.delete_task(id).await;
        self.ensure_active()?;

        match result {
            Ok(()) => {
                let removed = self.cache.write().await.remove(id);
                if removed.is_none() {
                    debug!(task_id = id, "Deleted task was not cached");
                }
                self.selection.write().await.invalidate(id);
                info!(task_id = id, "Task deleted");
                self.notifier.notify(Notification::success("Task deleted"));
                Ok(MutationOutcome {
                    value: removed,
                    next: self.home_route(),
                })
            }
            Err(e) => {
                self.report_failure("delete task", &e);
                Err(e)
            }
        }
    }

    pub async fn selection(&self) -> Selection {
        self.selection.read().await.clone()
    }

    /// Open a cached task for viewing
    pub async fn view_details(&self, id: i64) -> Result<TaskDetail> {
        let detail = self.cached_detail(id).await?;
        self.selection.write().await.view_details(detail.task.clone());
        Ok(detail)
    }

    /// Open a cached task for editing
    pub async fn edit_requested(&self, id: i64) -> Result<TaskDetail> {
        let detail = self.cached_detail(id).await?;
        self.selection.write().await.edit_requested(detail.task.clone());
        Ok(detail)
    }

    pub async fn close(&self) {
        self.selection.write().await.close();
    }

    /// The open task with its responsible user resolved from the cache
    pub async fn selected_detail(&self) -> Option<TaskDetail> {
        let task = self.selection.read().await.task().cloned()?;
        let user = self.cache.read().await.find_user(task.user_id).cloned();
        Some(TaskDetail { task, user })
    }

    async fn cached_detail(&self, id: i64) -> Result<TaskDetail> {
        let cache = self.cache.read().await;
        let task = cache
            .find_task(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("task {}", id)))?;
        let user = cache.find_user(task.user_id).cloned();
        Ok(TaskDetail { task, user })
    }

    /// Fetch a task and the users from the server, then open it for viewing
    ///
    /// On failure the error is notified and the caller is sent back to the
    /// list.
    pub async fn open_details(&self, id: i64) -> std::result::Result<TaskDetail, Redirect> {
        let redirect = |error| Redirect {
            error,
            next: self.home_route(),
        };
        self.ensure_active().map_err(redirect)?;
        let result = tokio::try_join!(self.api.get_task(id), self.api.list_users());
        self.ensure_active().map_err(redirect)?;

        match result {
            Ok((task, users)) => {
                let user = user::find_user(&users, task.user_id).cloned();
                self.selection.write().await.view_details(task.clone());
                Ok(TaskDetail { task, user })
            }
            Err(e) => {
                self.report_failure("load task details", &e);
                Err(redirect(e))
            }
        }
    }

    /// Fetch a task and the users from the server and pre-fill the edit form
    pub async fn prepare_edit(&self, id: i64) -> Result<EditForm> {
        self.ensure_active()?;
        let result = tokio::try_join!(self.api.get_task(id), self.api.list_users());
        self.ensure_active()?;

        match result {
            Ok((task, users)) => {
                let input = TaskInput::from(&task);
                self.selection.write().await.edit_requested(task);
                Ok(EditForm {
                    task_id: id,
                    input,
                    users,
                })
            }
            Err(e) => {
                self.report_failure("load task data", &e);
                Err(e)
            }
        }
    }
}

impl Drop for TaskController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{BroadcastNotifier, NotificationKind};
    use crate::task::{TaskPayload, TaskPriority};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::broadcast;
    use tokio::sync::Notify;

    /// In-memory remote store that counts every call
    #[derive(Default)]
    struct FakeApi {
        tasks: Mutex<Vec<Task>>,
        users: Vec<User>,
        next_id: AtomicUsize,
        calls: AtomicUsize,
        fail_users: bool,
        fail_mutations: Option<fn() -> Error>,
        gate: Option<Arc<Notify>>,
        list_gate: Option<Arc<Notify>>,
    }

    impl FakeApi {
        fn seeded(tasks: Vec<Task>, users: Vec<User>) -> Self {
            Self {
                next_id: AtomicUsize::new(100),
                tasks: Mutex::new(tasks),
                users,
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        async fn wait_gate(&self) {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
        }
    }

    fn from_payload(id: i64, payload: &TaskPayload) -> Task {
        Task {
            id,
            title: payload.title.clone(),
            description: payload.description.clone(),
            status: payload.status.clone(),
            priority: payload.priority.clone(),
            user_id: payload.user_id,
        }
    }

    #[async_trait]
    impl TaskApi for FakeApi {
        async fn list_tasks(&self) -> Result<Vec<Task>> {
            self.hit();
            let snapshot = self.tasks.lock().clone();
            if let Some(gate) = &self.list_gate {
                gate.notified().await;
            }
            Ok(snapshot)
        }

        async fn get_task(&self, id: i64) -> Result<Task> {
            self.hit();
            self.tasks
                .lock()
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("task {}", id)))
        }

        async fn create_task(&self, payload: &TaskPayload) -> Result<Task> {
            self.hit();
            self.wait_gate().await;
            if let Some(fail) = self.fail_mutations {
                return Err(fail());
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
            let task = from_payload(id, payload);
            self.tasks.lock().push(task.clone());
            Ok(task)
        }

        async fn update_task(&self, id: i64, payload: &TaskPayload) -> Result<Task> {
            self.hit();
            if let Some(fail) = self.fail_mutations {
                return Err(fail());
            }
            let task = from_payload(id, payload);
            let mut tasks = self.tasks.lock();
            match tasks.iter_mut().find(|t| t.id == id) {
                Some(existing) => *existing = task.clone(),
                None => return Err(Error::NotFound(format!("task {}", id))),
            }
            Ok(task)
        }

        async fn delete_task(&self, id: i64) -> Result<()> {
            self.hit();
            self.wait_gate().await;
            if let Some(fail) = self.fail_mutations {
                return Err(fail());
            }
            self.tasks.lock().retain(|t| t.id != id);
            Ok(())
        }

        async fn list_users(&self) -> Result<Vec<User>> {
            self.hit();
            if self.fail_users {
                return Err(Error::Unreachable("connection refused".into()));
            }
            Ok(self.users.clone())
        }
    }

    fn users() -> Vec<User> {
        vec![
            User::new(1, "Ana", "ana@example.com"),
            User::new(2, "Bruno", "bruno@example.com"),
        ]
    }

    fn seed() -> Vec<Task> {
        vec![
            Task::new(1, "B")
                .with_description("second")
                .with_priority(TaskPriority::Low)
                .with_user(1),
            Task::new(2, "A")
                .with_description("first")
                .with_priority(TaskPriority::High)
                .with_status(TaskStatus::Completed)
                .with_user(7),
        ]
    }

    fn controller(api: FakeApi) -> (TaskController, Arc<FakeApi>, broadcast::Receiver<Notification>) {
        let api = Arc::new(api);
        let notifier = BroadcastNotifier::default();
        let rx = notifier.subscribe();
        let controller = TaskController::new(api.clone(), Arc::new(notifier));
        (controller, api, rx)
    }

    fn valid_input() -> TaskInput {
        TaskInput::new("Nova tarefa", "Descrição")
            .with_status(TaskStatus::Pending)
            .with_user(2)
    }

    #[tokio::test]
    async fn test_load_populates_cache() {
        let (controller, api, _rx) = controller(FakeApi::seeded(seed(), users()));
        assert!(controller.is_loading().await);

        controller.load().await.unwrap();

        let cache = controller.snapshot().await;
        assert!(!cache.loading);
        assert_eq!(cache.tasks.len(), 2);
        assert_eq!(cache.users.len(), 2);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_load_failure_leaves_cache_empty() {
        let mut api = FakeApi::seeded(seed(), users());
        api.fail_users = true;
        let (controller, _api, mut rx) = controller(api);

        let err = controller.load().await.unwrap_err();
        assert!(matches!(err, Error::DataLoadFailed(_)));

        let cache = controller.snapshot().await;
        assert!(cache.tasks.is_empty());
        assert!(!cache.loading);
        assert_eq!(rx.try_recv().unwrap(), Notification::error("load failed"));
    }

    #[tokio::test]
    async fn test_view_sorts_and_paginates() {
        let (controller, _api, _rx) = controller(FakeApi::seeded(seed(), users()));
        controller.load().await.unwrap();

        let page = controller.view().await;
        assert_eq!(page.items.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 1]);

        controller.set_sort(SortOrder::Date).await;
        controller.set_page(2, 5).await.unwrap();
        let page = controller.view().await;
        assert!(page.items.is_empty());
        assert_eq!(page.total, 2);
        assert_eq!(controller.page_count().await, 1);

        assert!(controller.set_page(1, 7).await.is_err());
    }

    #[tokio::test]
    async fn test_create_appends_and_notifies() {
        let (controller, _api, mut rx) = controller(FakeApi::seeded(seed(), users()));
        controller.load().await.unwrap();

        let outcome = controller.create(&valid_input()).await.unwrap();
        assert_eq!(outcome.value.id, 100);
        assert_eq!(outcome.next, Route::List);

        let tasks = controller.tasks().await;
        assert_eq!(tasks.last().map(|t| t.id), Some(100));
        assert_eq!(rx.try_recv().unwrap(), Notification::success("Task created"));
    }

    #[tokio::test]
    async fn test_create_validation_makes_no_calls() {
        let (controller, api, mut rx) = controller(FakeApi::seeded(seed(), users()));
        controller.load().await.unwrap();
        let before = controller.snapshot().await;

        let mut input = valid_input();
        input.title = String::new();
        let err = controller.create(&input).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(api.calls(), 2);
        assert_eq!(controller.snapshot().await, before);
        assert_eq!(rx.try_recv().unwrap().kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_create_failure_keeps_cache() {
        let mut api = FakeApi::seeded(seed(), users());
        api.fail_mutations = Some(|| Error::ServerError {
            status: 500,
            message: String::new(),
        });
        let (controller, _api, mut rx) = controller(api);
        controller.load().await.unwrap();

        let err = controller.create(&valid_input()).await.unwrap_err();
        assert!(matches!(err, Error::ServerError { .. }));
        assert_eq!(controller.tasks().await.len(), 2);

        let note = rx.try_recv().unwrap();
        assert!(note.is_error());
        assert!(note.message.contains("server failed"));
    }

    #[tokio::test]
    async fn test_update_replaces_cached_record() {
        let (controller, _api, mut rx) = controller(FakeApi::seeded(seed(), users()));
        controller.load().await.unwrap();
        controller.edit_requested(1).await.unwrap();

        let input = TaskInput::new("B editada", "nova")
            .with_status(TaskStatus::InProgress)
            .with_user(2);
        let outcome = controller.update(1, &input).await.unwrap();
        assert_eq!(outcome.next, Route::List);

        let tasks = controller.tasks().await;
        assert_eq!(tasks[0].id, 1);
        assert_eq!(tasks[0].title, "B editada");
        assert_eq!(tasks.len(), 2);

        let selected = controller.selected_detail().await.unwrap();
        assert_eq!(selected.task.title, "B editada");
        assert_eq!(selected.responsible_name(), "Bruno");
        assert_eq!(rx.try_recv().unwrap(), Notification::success("Task updated"));
    }

    #[tokio::test]
    async fn test_delete_absent_id_is_success() {
        let (controller, _api, mut rx) = controller(FakeApi::seeded(seed(), users()));
        controller.load().await.unwrap();
        let before = controller.snapshot().await;

        let outcome = controller.delete(5).await.unwrap();
        assert!(outcome.value.is_none());
        assert_eq!(controller.snapshot().await, before);
        assert_eq!(rx.try_recv().unwrap(), Notification::success("Task deleted"));
    }

    #[tokio::test]
    async fn test_delete_closes_open_task() {
        let (controller, _api, _rx) = controller(FakeApi::seeded(seed(), users()));
        controller.load().await.unwrap();
        controller.view_details(2).await.unwrap();

        let outcome = controller.delete(2).await.unwrap();
        assert_eq!(outcome.value.map(|t| t.id), Some(2));
        assert!(!controller.selection().await.is_visible());
        assert_eq!(controller.tasks().await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_delete_is_rejected() {
        let gate = Arc::new(Notify::new());
        let mut api = FakeApi::seeded(seed(), users());
        api.gate = Some(gate.clone());
        let (controller, api, _rx) = controller(api);
        let controller = Arc::new(controller);
        controller.load().await.unwrap();

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.delete(1).await })
        };
        while api.calls() < 3 {
            tokio::task::yield_now().await;
        }

        let second = controller.delete(1).await;
        assert!(matches!(second, Err(Error::Busy(_))));
        assert_eq!(api.calls(), 3);

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());

        // released once the first call settled
        gate.notify_one();
        assert!(controller.delete(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let gate = Arc::new(Notify::new());
        let mut api = FakeApi::seeded(seed(), users());
        api.gate = Some(gate.clone());
        let (controller, api, mut rx) = controller(api);
        let controller = Arc::new(controller);
        controller.load().await.unwrap();

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.create(&valid_input()).await })
        };
        while api.calls() < 3 {
            tokio::task::yield_now().await;
        }

        let second = controller.create(&valid_input()).await;
        assert!(matches!(second, Err(Error::Busy(_))));
        assert_eq!(api.calls(), 3);
        assert!(rx.try_recv().is_err());

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert_eq!(controller.tasks().await.len(), 3);
        assert_eq!(api.tasks.lock().len(), 3);
        assert_eq!(rx.try_recv().unwrap(), Notification::success("Task created"));
    }

    #[tokio::test]
    async fn test_mutations_during_load_survive_it() {
        let list_gate = Arc::new(Notify::new());
        let mut api = FakeApi::seeded(seed(), users());
        api.list_gate = Some(list_gate.clone());
        let (controller, api, _rx) = controller(api);
        let controller = Arc::new(controller);

        let loading = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.load().await })
        };
        // both fetches issued, the task list is held back with [1, 2]
        while api.calls() < 2 {
            tokio::task::yield_now().await;
        }

        let created = controller.create(&valid_input()).await.unwrap();
        controller.delete(1).await.unwrap();
        assert_eq!(
            controller.tasks().await.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![created.value.id]
        );

        list_gate.notify_one();
        loading.await.unwrap().unwrap();

        let mut ids: Vec<i64> = controller.tasks().await.iter().map(|t| t.id).collect();
        ids.sort();
        assert_eq!(ids, vec![2, created.value.id]);
        assert!(!controller.is_loading().await);
    }

    #[tokio::test]
    async fn test_failed_detail_fetch_redirects_home() {
        let (controller, _api, mut rx) = controller(FakeApi::seeded(seed(), users()));

        let redirect = controller.open_details(99).await.unwrap_err();
        assert!(matches!(redirect.error, Error::NotFound(_)));
        assert_eq!(redirect.next, Route::List);
        assert!(!controller.selection().await.is_visible());

        let note = rx.try_recv().unwrap();
        assert!(note.is_error());
        assert!(note.message.starts_with("Failed to load task details"));
    }

    #[tokio::test]
    async fn test_disposed_controller_drops_results() {
        let gate = Arc::new(Notify::new());
        let mut api = FakeApi::seeded(seed(), users());
        api.gate = Some(gate.clone());
        let (controller, api, _rx) = controller(api);
        let controller = Arc::new(controller);
        controller.load().await.unwrap();

        let pending = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.create(&valid_input()).await })
        };
        while api.calls() < 3 {
            tokio::task::yield_now().await;
        }

        controller.dispose();
        gate.notify_one();

        assert!(matches!(pending.await.unwrap(), Err(Error::Cancelled)));
        assert_eq!(controller.tasks().await.len(), 2);
        assert!(matches!(controller.load().await, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_completed_controller_filters() {
        let api = Arc::new(FakeApi::seeded(seed(), users()));
        let controller = TaskController::completed(api, Arc::new(BroadcastNotifier::default()));
        controller.load().await.unwrap();

        let tasks = controller.tasks().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 2);
        assert_eq!(controller.home_route(), Route::Completed);

        // reopening a completed task moves it out of this view
        let input = TaskInput::from(&tasks[0]).with_status(TaskStatus::Pending);
        controller.update(2, &input).await.unwrap();
        assert!(controller.tasks().await.is_empty());

        // a new pending task does not belong here either
        controller.create(&valid_input()).await.unwrap();
        assert!(controller.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_detail_with_unknown_user() {
        let (controller, _api, _rx) = controller(FakeApi::seeded(seed(), users()));
        controller.load().await.unwrap();

        let detail = controller.view_details(2).await.unwrap();
        assert!(detail.user.is_none());
        assert_eq!(detail.responsible_name(), "User not found");
        assert_eq!(detail.responsible_email(), "Email not found");

        assert!(matches!(controller.view_details(42).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_open_details_and_prepare_edit() {
        let (controller, _api, mut rx) = controller(FakeApi::seeded(seed(), users()));

        let detail = controller.open_details(1).await.unwrap();
        assert_eq!(detail.responsible_name(), "Ana");
        assert!(controller.selection().await.is_visible());

        let form = controller.prepare_edit(1).await.unwrap();
        assert_eq!(form.input.title, "B");
        assert_eq!(form.input.user_id, Some(1));
        assert_eq!(form.users.len(), 2);

        assert!(controller.open_details(99).await.is_err());
        assert!(rx.try_recv().unwrap().is_error());
    }
}
