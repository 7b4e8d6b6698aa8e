//! Shared fixtures for the integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use taskdesk_core::{BroadcastNotifier, ClientConfig, HttpTaskApi, Notification, TaskController};
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start a mock remote API
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn api_for(server: &MockServer) -> HttpTaskApi {
    let config = ClientConfig::default().with_base_url(server.uri());
    HttpTaskApi::new(&config).expect("mock server URI is valid")
}

/// Controller wired to the mock server, plus a receiver for its notifications
pub fn controller_for(server: &MockServer) -> (TaskController, broadcast::Receiver<Notification>) {
    let notifier = BroadcastNotifier::default();
    let rx = notifier.subscribe();
    let controller = TaskController::new(Arc::new(api_for(server)), Arc::new(notifier));
    (controller, rx)
}

pub fn tasks_json() -> Value {
    json!([
        {"id": 1, "title": "B", "description": "segunda", "status": "Pendente", "priority": "Baixa", "user_id": 1},
        {"id": 2, "title": "A", "description": "primeira", "status": "Concluído", "priority": "Alta", "user_id": 2},
        {"id": 3, "title": "C", "description": "sem prioridade", "status": "Em andamento", "user_id": 9}
    ])
}

pub fn users_json() -> Value {
    json!([
        {"id": 1, "name": "Ana", "email": "ana@example.com"},
        {"id": 2, "name": "Bruno", "email": "bruno@example.com"}
    ])
}

/// Mount GET /api/task and GET /api/users with the default fixtures
pub async fn mount_collections(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/task"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tasks_json()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users_json()))
        .mount(server)
        .await;
}
