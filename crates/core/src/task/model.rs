//! Task model definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Task status as the remote API spells it
///
/// Values the client does not know are kept verbatim in `Other` so that a
/// record round-trips unchanged; they sort after every known status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Other(String),
}

impl TaskStatus {
    /// All statuses a form may offer
    pub const ALLOWED: [TaskStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Wire label
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pendente",
            Self::InProgress => "Em andamento",
            Self::Completed => "Concluído",
            Self::Other(raw) => raw,
        }
    }

    /// Sort rank: Pendente=1, Em andamento=2, Concluído=3, anything else=4
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 1,
            Self::InProgress => 2,
            Self::Completed => 3,
            Self::Other(_) => 4,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Pendente" => Self::Pending,
            "Em andamento" => Self::InProgress,
            "Concluído" => Self::Completed,
            _ => Self::Other(raw),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    /// Strict parse for user input: wire labels or their English aliases
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pendente" | "pending" | "todo" => Ok(Self::Pending),
            "em andamento" | "in-progress" | "in_progress" | "doing" => Ok(Self::InProgress),
            "concluído" | "concluido" | "completed" | "done" => Ok(Self::Completed),
            other => Err(Error::validation(format!("unknown status '{}'", other))),
        }
    }
}

/// Task priority as the remote API spells it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
    Other(String),
}

impl TaskPriority {
    pub const ALLOWED: [TaskPriority; 3] = [Self::High, Self::Medium, Self::Low];

    /// Wire label
    pub fn as_str(&self) -> &str {
        match self {
            Self::High => "Alta",
            Self::Medium => "Média",
            Self::Low => "Baixa",
            Self::Other(raw) => raw,
        }
    }

    /// Sort rank of an optional priority: Alta=1, Média=2, Baixa=3, absent or unknown=4
    pub fn rank(priority: Option<&TaskPriority>) -> u8 {
        match priority {
            Some(Self::High) => 1,
            Some(Self::Medium) => 2,
            Some(Self::Low) => 3,
            Some(Self::Other(_)) | None => 4,
        }
    }
}

impl From<String> for TaskPriority {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Alta" => Self::High,
            "Média" => Self::Medium,
            "Baixa" => Self::Low,
            _ => Self::Other(raw),
        }
    }
}

impl From<TaskPriority> for String {
    fn from(priority: TaskPriority) -> Self {
        match priority {
            TaskPriority::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "alta" | "high" => Ok(Self::High),
            "média" | "media" | "medium" => Ok(Self::Medium),
            "baixa" | "low" => Ok(Self::Low),
            other => Err(Error::validation(format!("unknown priority '{}'", other))),
        }
    }
}

/// A task record owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned id
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// Owning user
    pub user_id: i64,
}

impl Task {
    /// Create a task with the given id and title
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: None,
            user_id: 0,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the owning user
    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = user_id;
        self
    }

    /// Description cut to `max_chars` characters, with "..." appended when cut
    pub fn description_preview(&self, max_chars: usize) -> String {
        match self.description.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &self.description[..idx]),
            None => self.description.clone(),
        }
    }
}
