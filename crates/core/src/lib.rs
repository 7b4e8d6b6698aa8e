//! Core library for Taskdesk
//!
//! This crate contains the client-side task state controller, including:
//! - Task and user models
//! - The remote task API client
//! - Collection cache, sorted/paginated views and selection state
//! - Create/update/delete coordination with single-flight guards

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod notify;
pub mod remote;
pub mod selection;
pub mod single_flight;
pub mod task;
pub mod user;
pub mod view;

pub use cache::CollectionCache;
pub use config::ClientConfig;
pub use controller::{EditForm, MutationOutcome, Redirect, TaskController, TaskDetail};
pub use error::Error;
pub use notify::{BroadcastNotifier, Notification, NotificationKind, Notifier, TracingNotifier};
pub use remote::{HttpTaskApi, TaskApi};
pub use selection::{Route, Selection, SelectionMode};
pub use task::{Task, TaskInput, TaskPayload, TaskPriority, TaskStatus};
pub use user::User;
pub use view::{derive_view, PageParams, PageSize, SortOrder, TaskPage};

pub type Result<T> = std::result::Result<T, Error>;
