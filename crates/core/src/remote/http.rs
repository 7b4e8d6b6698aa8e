//! HTTP implementation of the remote task store

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::TaskApi;
use crate::config::ClientConfig;
use crate::task::{Task, TaskPayload};
use crate::user::User;
use crate::{Error, Result};

/// reqwest client for the `/api/task` and `/api/users` endpoints
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: Client,
    base_url: String,
}

impl HttpTaskApi {
    /// Create a client for the configured base URL
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and turn any non-2xx status into a typed error
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(Error::from_transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Remote API returned {}: {}", status, body);
            return Err(Error::from_status(status, &body));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.client.get(self.url(path))).await?;
        response.json().await.map_err(Error::from_transport)
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.get_json("/api/task").await
    }

    async fn get_task(&self, id: i64) -> Result<Task> {
        self.get_json(&format!("/api/task/{}", id)).await
    }

    async fn create_task(&self, payload: &TaskPayload) -> Result<Task> {
        let response = self
            .send(self.client.post(self.url("/api/task")).json(payload))
            .await?;
        response.json().await.map_err(Error::from_transport)
    }

    async fn update_task(&self, id: i64, payload: &TaskPayload) -> Result<Task> {
        let response = self
            .send(
                self.client
                    .put(self.url(&format!("/api/task/{}", id)))
                    .json(payload),
            )
            .await?;

        // Some servers acknowledge an update with an empty body
        let body = response.text().await.map_err(Error::from_transport)?;
        if body.trim().is_empty() {
            return Ok(Task {
                id,
                title: payload.title.clone(),
                description: payload.description.clone(),
                status: payload.status.clone(),
                priority: payload.priority.clone(),
                user_id: payload.user_id,
            });
        }
        serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))
    }

    async fn delete_task(&self, id: i64) -> Result<()> {
        self.send(self.client.delete(self.url(&format!("/api/task/{}", id))))
            .await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.get_json("/api/users").await
    }
}
