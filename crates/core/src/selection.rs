//! Selection/detail state and navigation intents

use serde::Serialize;

use crate::task::Task;

/// Where the front end should go next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "route", content = "id")]
pub enum Route {
    List,
    Completed,
    Create,
    Detail(i64),
    Edit(i64),
}

/// Why a task is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    View,
    Edit,
}

/// Which task, if any, is open for viewing or editing
///
/// Only one task can be open; opening another replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Closed,
    Open { task: Task, mode: SelectionMode },
}

impl Selection {
    pub fn view_details(&mut self, task: Task) {
        *self = Self::Open {
            task,
            mode: SelectionMode::View,
        };
    }

    pub fn edit_requested(&mut self, task: Task) {
        *self = Self::Open {
            task,
            mode: SelectionMode::Edit,
        };
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    pub fn task(&self) -> Option<&Task> {
        match self {
            Self::Open { task, .. } => Some(task),
            Self::Closed => None,
        }
    }

    pub fn mode(&self) -> Option<SelectionMode> {
        match self {
            Self::Open { mode, .. } => Some(*mode),
            Self::Closed => None,
        }
    }

    /// Close if the open task is `id`; returns whether it was closed
    pub fn invalidate(&mut self, id: i64) -> bool {
        if self.task().is_some_and(|t| t.id == id) {
            self.close();
            return true;
        }
        false
    }

    /// Swap in a fresher copy of the open task
    pub fn refresh(&mut self, updated: &Task) {
        if let Self::Open { task, .. } = self {
            if task.id == updated.id {
                *task = updated.clone();
            }
        }
    }
}
