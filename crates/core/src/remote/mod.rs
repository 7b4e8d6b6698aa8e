//! Remote task store
//!
//! The controller only talks to the remote API through [`TaskApi`], so tests
//! and alternative transports can stand in for the HTTP client.

mod http;

use async_trait::async_trait;

use crate::task::{Task, TaskPayload};
use crate::user::User;
use crate::Result;

pub use http::HttpTaskApi;

/// Interface of the remote task/user API
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// GET /api/task
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// GET /api/task/{id}
    async fn get_task(&self, id: i64) -> Result<Task>;

    /// POST /api/task
    async fn create_task(&self, payload: &TaskPayload) -> Result<Task>;

    /// PUT /api/task/{id}
    async fn update_task(&self, id: i64, payload: &TaskPayload) -> Result<Task>;

    /// DELETE /api/task/{id}
    async fn delete_task(&self, id: i64) -> Result<()>;

    /// GET /api/users
    async fn list_users(&self) -> Result<Vec<User>>;
}
