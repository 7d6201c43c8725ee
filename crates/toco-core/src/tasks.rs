//! Task collection view-model.
//!
//! Holds the signed-in user's tasks, newest first, and keeps that ordering
//! through creates, edits and deletes without refetching. All server calls
//! go through [`ApiClient`]; a 401 on any of them tears the session down.

use crate::api::{ApiClient, ApiError, ApiErrorKind, ApiResult, Task, TaskPatch};
use crate::session::Session;

/// Maximum accepted title length, in characters.
pub const TITLE_MAX: usize = 200;
/// Maximum accepted description length, in characters.
pub const DESCRIPTION_MAX: usize = 2000;

/// Completion filter applied when rendering the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
        }
    }
}

/// Validates and normalizes a task title.
///
/// # Errors
/// Returns a validation error when the trimmed title is empty or longer
/// than [`TITLE_MAX`] characters.
pub fn validate_title(raw: &str) -> ApiResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Title cannot be empty"));
    }
    if title.chars().count() > TITLE_MAX {
        return Err(ApiError::validation(format!(
            "Title must be at most {TITLE_MAX} characters"
        )));
    }
    Ok(title.to_string())
}

/// Validates a task description.
///
/// # Errors
/// Returns a validation error when the description is longer than
/// [`DESCRIPTION_MAX`] characters.
pub fn validate_description(raw: Option<&str>) -> ApiResult<Option<String>> {
    match raw {
        Some(text) if text.chars().count() > DESCRIPTION_MAX => Err(ApiError::validation(format!(
            "Description must be at most {DESCRIPTION_MAX} characters"
        ))),
        Some(text) => Ok(Some(text.to_string())),
        None => Ok(None),
    }
}

/// The task collection, ordered newest first.
#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Returns the tasks that pass the filter, preserving order.
    pub fn filtered(&self, filter: TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Replaces the collection, newest first.
    pub fn replace_all(&mut self, mut tasks: Vec<Task>) {
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.tasks = tasks;
    }

    /// Inserts a freshly created task at the top.
    pub fn apply_created(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    /// Replaces the matching task in place, keeping its position. A task
    /// that is not in the collection is ignored.
    pub fn apply_updated(&mut self, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        }
    }

    /// Removes the task with the given id, if present.
    pub fn apply_deleted(&mut self, id: &str) {
        self.tasks.retain(|t| t.id != id);
    }

    /// Computes the completion flip for a task in the collection.
    ///
    /// # Errors
    /// Returns a validation error when no task has the given id.
    pub fn toggle_patch(&self, id: &str) -> ApiResult<TaskPatch> {
        let task = self
            .get(id)
            .ok_or_else(|| ApiError::validation(format!("No task with id {id}")))?;
        Ok(TaskPatch::completion(!task.completed))
    }

    /// Fetches the user's tasks and replaces the collection.
    ///
    /// Entries the server attributes to another user are dropped with a
    /// warning rather than shown.
    ///
    /// # Errors
    /// Returns the API error; a 401 also clears the session.
    pub async fn load(&mut self, api: &ApiClient, session: &mut Session) -> ApiResult<()> {
        let token = active_token(session)?;
        let mut tasks = api
            .list_tasks(&token)
            .await
            .map_err(|e| expire_if_unauthorized(session, e))?;

        if let Some(user) = session.user() {
            retain_owned(&mut tasks, &user.id);
        }
        self.replace_all(tasks);
        Ok(())
    }

    /// Creates a task and prepends it to the collection.
    ///
    /// # Errors
    /// Returns a validation error before any request when the title or
    /// description is invalid, otherwise the API error.
    pub async fn create(
        &mut self,
        api: &ApiClient,
        session: &mut Session,
        title: &str,
        description: Option<&str>,
    ) -> ApiResult<Task> {
        let title = validate_title(title)?;
        let description = validate_description(description)?;

        let token = active_token(session)?;
        let task = api
            .create_task(&token, &title, description.as_deref())
            .await
            .map_err(|e| expire_if_unauthorized(session, e))?;

        self.apply_created(task.clone());
        Ok(task)
    }

    /// Applies a partial edit to a task.
    ///
    /// # Errors
    /// Returns a validation error when the patch is empty or its fields are
    /// invalid, otherwise the API error.
    pub async fn update(
        &mut self,
        api: &ApiClient,
        session: &mut Session,
        id: &str,
        mut patch: TaskPatch,
    ) -> ApiResult<Task> {
        if patch.is_empty() {
            return Err(ApiError::validation("Nothing to update"));
        }
        if let Some(title) = &patch.title {
            patch.title = Some(validate_title(title)?);
        }
        validate_description(patch.description.as_deref())?;

        let token = active_token(session)?;
        let task = api
            .update_task(&token, id, &patch)
            .await
            .map_err(|e| expire_if_unauthorized(session, e))?;

        self.apply_updated(task.clone());
        Ok(task)
    }

    /// Flips a task's completion state.
    ///
    /// # Errors
    /// Returns a validation error when the task is not in the collection,
    /// otherwise the API error.
    pub async fn toggle(
        &mut self,
        api: &ApiClient,
        session: &mut Session,
        id: &str,
    ) -> ApiResult<Task> {
        let patch = self.toggle_patch(id)?;
        self.update(api, session, id, patch).await
    }

    /// Marks a task complete or active, regardless of its current state.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn set_completed(
        &mut self,
        api: &ApiClient,
        session: &mut Session,
        id: &str,
        completed: bool,
    ) -> ApiResult<Task> {
        self.update(api, session, id, TaskPatch::completion(completed))
            .await
    }

    /// Deletes a task and removes it from the collection.
    ///
    /// # Errors
    /// Returns the API error.
    pub async fn delete(&mut self, api: &ApiClient, session: &mut Session, id: &str) -> ApiResult<()> {
        let token = active_token(session)?;
        api.delete_task(&token, id)
            .await
            .map_err(|e| expire_if_unauthorized(session, e))?;

        self.apply_deleted(id);
        Ok(())
    }
}

/// Fetches a single task fresh from the server.
///
/// # Errors
/// Returns the API error; a 401 also clears the session.
pub async fn fetch(api: &ApiClient, session: &mut Session, id: &str) -> ApiResult<Task> {
    let token = active_token(session)?;
    api.get_task(&token, id)
        .await
        .map_err(|e| expire_if_unauthorized(session, e))
}

fn active_token(session: &Session) -> ApiResult<String> {
    session
        .token()
        .map(str::to_string)
        .ok_or_else(|| ApiError::new(ApiErrorKind::Unauthorized, "Not signed in"))
}

fn expire_if_unauthorized(session: &mut Session, err: ApiError) -> ApiError {
    if err.is_unauthorized() {
        tracing::info!("server rejected the session token");
        session.force_logout();
    }
    err
}

fn retain_owned(tasks: &mut Vec<Task>, user_id: &str) {
    let before = tasks.len();
    tasks.retain(|t| t.user_id == user_id);
    let dropped = before - tasks.len();
    if dropped > 0 {
        tracing::warn!(dropped, "server returned tasks not owned by the current user");
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use tempfile::tempdir;

    use super::*;
    use crate::session::{Session, TokenStore};

    fn task(id: &str, completed: bool, created_offset: i64) -> Task {
        let at = DateTime::from_timestamp(1_700_000_000 + created_offset, 0).unwrap();
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            description: None,
            completed,
            user_id: "user-1".to_string(),
            created_at: at,
            updated_at: at,
            completed_at: completed.then_some(at),
        }
    }

    /// Test: replace_all orders newest first.
    #[test]
    fn test_replace_all_sorts_newest_first() {
        let mut list = TaskList::new();
        list.replace_all(vec![task("a", false, 10), task("b", false, 30), task("c", false, 20)]);

        let ids: Vec<&str> = list.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    /// Test: created tasks go to the top.
    #[test]
    fn test_apply_created_prepends() {
        let mut list = TaskList::new();
        list.replace_all(vec![task("a", false, 10)]);
        list.apply_created(task("b", false, 20));

        let ids: Vec<&str> = list.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    /// Test: updates replace in place without reordering.
    #[test]
    fn test_apply_updated_keeps_position() {
        let mut list = TaskList::new();
        list.replace_all(vec![task("a", false, 30), task("b", false, 20), task("c", false, 10)]);

        list.apply_updated(task("b", true, 20));

        let ids: Vec<&str> = list.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(list.get("b").unwrap().completed);
    }

    /// Test: updating a task that is not held is a no-op.
    #[test]
    fn test_apply_updated_ignores_unknown() {
        let mut list = TaskList::new();
        list.replace_all(vec![task("a", false, 10)]);
        list.apply_updated(task("zzz", true, 40));

        assert_eq!(list.len(), 1);
        assert!(list.get("zzz").is_none());
    }

    /// Test: deletes remove exactly the matching task.
    #[test]
    fn test_apply_deleted() {
        let mut list = TaskList::new();
        list.replace_all(vec![task("a", false, 20), task("b", false, 10)]);

        list.apply_deleted("a");
        assert_eq!(list.len(), 1);
        assert!(list.get("a").is_none());

        // Absent id is a no-op
        list.apply_deleted("a");
        assert_eq!(list.len(), 1);
    }

    /// Test: filters partition the collection.
    #[test]
    fn test_filtered_partitions() {
        let mut list = TaskList::new();
        list.replace_all(vec![task("a", true, 30), task("b", false, 20), task("c", true, 10)]);

        assert_eq!(list.filtered(TaskFilter::All).len(), 3);
        assert_eq!(list.filtered(TaskFilter::Active).len(), 1);
        assert_eq!(list.filtered(TaskFilter::Completed).len(), 2);
        assert_eq!(list.completed_count(), 2);
    }

    /// Test: toggling twice restores the original completion state.
    #[test]
    fn test_double_toggle_round_trips() {
        let mut list = TaskList::new();
        list.replace_all(vec![task("a", false, 10)]);

        let patch = list.toggle_patch("a").unwrap();
        assert_eq!(patch.completed, Some(true));
        list.apply_updated(task("a", true, 10));

        let patch = list.toggle_patch("a").unwrap();
        assert_eq!(patch.completed, Some(false));
    }

    /// Test: toggling an unknown id is a validation error.
    #[test]
    fn test_toggle_patch_unknown_id() {
        let list = TaskList::new();
        let err = list.toggle_patch("nope").unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
    }

    /// Test: titles are trimmed and bounded.
    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  buy milk  ").unwrap(), "buy milk");
        assert_eq!(validate_title(&"x".repeat(TITLE_MAX)).unwrap().len(), TITLE_MAX);

        assert_eq!(
            validate_title("   ").unwrap_err().kind,
            ApiErrorKind::Validation
        );
        assert_eq!(
            validate_title(&"x".repeat(TITLE_MAX + 1)).unwrap_err().kind,
            ApiErrorKind::Validation
        );
    }

    /// Test: descriptions are bounded but not required.
    #[test]
    fn test_validate_description() {
        assert_eq!(validate_description(None).unwrap(), None);
        assert!(validate_description(Some(&"x".repeat(DESCRIPTION_MAX))).is_ok());
        assert_eq!(
            validate_description(Some(&"x".repeat(DESCRIPTION_MAX + 1)))
                .unwrap_err()
                .kind,
            ApiErrorKind::Validation
        );
    }

    /// Test: tasks owned by other users are dropped.
    #[test]
    fn test_retain_owned_drops_foreign_tasks() {
        let mut tasks = vec![task("a", false, 20), task("b", false, 10)];
        tasks[1].user_id = "someone-else".to_string();

        retain_owned(&mut tasks, "user-1");

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "a");
    }

    /// Test: a 401 tears the session down; other errors leave it alone.
    #[test]
    fn test_expire_if_unauthorized_forces_logout() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("session.json"));
        store.save("server-issued-token").unwrap();
        let mut session = Session::new(store);
        session.bootstrap().unwrap();

        let err =
            expire_if_unauthorized(&mut session, ApiError::new(ApiErrorKind::Server, "boom"));
        assert_eq!(err.kind, ApiErrorKind::Server);
        assert!(session.token().is_some());

        let err = expire_if_unauthorized(
            &mut session,
            ApiError::new(ApiErrorKind::Unauthorized, "token expired"),
        );
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
        assert!(session.token().is_none());
        assert!(!dir.path().join("session.json").exists());
    }
}
