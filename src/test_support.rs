//! Shared fixtures for unit tests: stub backends and throwaway storage.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::net::gateway::Gateway;
use crate::net::types::User;
use crate::state::session::SessionStore;
use crate::state::storage::MemoryStorage;

/// Address nothing listens on; connections are refused immediately.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn config_for(base_url: &str) -> Config {
    Config {
        health_timeout: Duration::from_millis(500),
        mock_delay: Duration::ZERO,
        ..Config::with_backend_url(base_url)
    }
}

pub fn gateway_for(base_url: &str) -> Gateway {
    Gateway::new(&config_for(base_url)).unwrap()
}

/// Initialized, logged-out session over in-memory storage.
pub fn memory_session() -> SessionStore {
    let session = SessionStore::new(Arc::new(MemoryStorage::new()));
    session.init();
    session
}

pub fn user(id: &str, name: &str) -> User {
    User {
        id: id.to_owned(),
        display_name: name.to_owned(),
        email: format!("{id}@example.com"),
        organization_id: None,
        role: None,
        is_email_verified: None,
        created_at: None,
    }
}

/// Navigator that records every path it is asked to open.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    paths: std::sync::Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl crate::guard::Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_owned());
    }
}
