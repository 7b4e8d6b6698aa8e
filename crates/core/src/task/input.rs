//! Create/edit form values and their validation

use serde::Serialize;

use super::model::{Task, TaskPriority, TaskStatus};
use crate::{Error, Result};

/// Raw values of the create/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub user_id: Option<i64>,
}

impl TaskInput {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Check required fields and allowed values
    ///
    /// Every problem is reported at once, e.g. "missing title, status".
    pub fn validate(&self) -> Result<TaskPayload> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.status.is_none() {
            missing.push("status");
        }
        if self.user_id.is_none() {
            missing.push("user_id");
        }
        if !missing.is_empty() {
            return Err(Error::validation(format!("missing {}", missing.join(", "))));
        }

        let (Some(status), Some(user_id)) = (self.status.clone(), self.user_id) else {
            return Err(Error::validation("missing status or user_id"));
        };
        if !TaskStatus::ALLOWED.contains(&status) {
            return Err(Error::validation(format!("status '{}' is not allowed", status)));
        }
        if let Some(priority) = self
            .priority
            .as_ref()
            .filter(|p| !TaskPriority::ALLOWED.contains(p))
        {
            return Err(Error::validation(format!("priority '{}' is not allowed", priority)));
        }

        Ok(TaskPayload {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            status,
            priority: self.priority.clone(),
            user_id,
        })
    }
}

impl From<&Task> for TaskInput {
    /// Pre-fill an edit form from a stored record
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: Some(task.status.clone()),
            priority: task.priority.clone(),
            user_id: Some(task.user_id),
        }
    }
}

/// Request body for POST /api/task and PUT /api/task/{id}
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    pub user_id: i64,
}
