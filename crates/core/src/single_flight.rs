//! Single-flight guard for mutations
//!
//! At most one operation per key may be in progress. A second caller with the
//! same key is turned away until the guard of the first one is dropped.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Kind of mutation being guarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// `(operation, task id)`; creates have no id yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlightKey {
    pub kind: MutationKind,
    pub task_id: Option<i64>,
}

impl FlightKey {
    pub fn create() -> Self {
        Self {
            kind: MutationKind::Create,
            task_id: None,
        }
    }

    pub fn update(task_id: i64) -> Self {
        Self {
            kind: MutationKind::Update,
            task_id: Some(task_id),
        }
    }

    pub fn delete(task_id: i64) -> Self {
        Self {
            kind: MutationKind::Delete,
            task_id: Some(task_id),
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.task_id {
            Some(id) => write!(f, "{} task {}", self.kind.as_str(), id),
            None => write!(f, "{} task", self.kind.as_str()),
        }
    }
}

/// Registry of in-flight keys
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    in_flight: Arc<Mutex<HashSet<FlightKey>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or `None` if it is already in flight
    pub fn try_acquire(&self, key: FlightKey) -> Option<FlightGuard> {
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(key) {
            return None;
        }
        Some(FlightGuard {
            key,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_in_flight(&self, key: &FlightKey) -> bool {
        self.in_flight.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.in_flight.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases its key when dropped, whether the operation succeeded or not
#[derive(Debug)]
pub struct FlightGuard {
    key: FlightKey,
    in_flight: Arc<Mutex<HashSet<FlightKey>>>,
}

impl FlightGuard {
    pub fn key(&self) -> FlightKey {
        self.key
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.key);
    }
}
