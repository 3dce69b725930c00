//! Test harness for integration tests
//! Runs a real `Portal` over reqwest against a mockito server

use std::path::PathBuf;

use mockito::{Mock, Server, ServerGuard};
use tempfile::TempDir;

use medportal_lib::{Config, FileTokenStore, Portal, TokenStore};

/// A mock REST service plus a file-backed token store in a temp dir
pub struct TestHarness {
    pub server: ServerGuard,
    _dir: TempDir,
    token_path: PathBuf,
}

impl TestHarness {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let token_path = dir.path().join("token.json");
        Self {
            server,
            _dir: dir,
            token_path,
        }
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.api.base_url = self.server.url();
        config.api.request_timeout_secs = 5;
        config.auth.verify_timeout_secs = 2;
        config.auth.token_store_path = self.token_path.clone();
        config
    }

    /// A fresh portal over the same token file, like a new page load
    pub fn portal(&self) -> Portal {
        Portal::new(self.config()).expect("failed to build portal")
    }

    pub fn token_store(&self) -> FileTokenStore {
        FileTokenStore::new(&self.token_path)
    }

    pub async fn store_token(&self, token: &str) {
        self.token_store()
            .set(token)
            .await
            .expect("failed to seed token");
    }

    pub async fn stored_token(&self) -> Option<String> {
        self.token_store()
            .get()
            .await
            .expect("failed to read token")
    }

    pub async fn mock_login(&mut self, token: &str) -> Mock {
        self.server
            .mock("POST", "/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({ "access_token": token, "token_type": "bearer" }).to_string(),
            )
            .create_async()
            .await
    }

    pub async fn mock_verify(&mut self, token: &str, role: &str) -> Mock {
        self.server
            .mock("GET", "/verify-token")
            .match_header("authorization", format!("Bearer {}", token).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({ "is_valid": true, "email": "user@example.com", "role": role })
                    .to_string(),
            )
            .create_async()
            .await
    }

    pub async fn mock_verify_rejected(&mut self) -> Mock {
        self.server
            .mock("GET", "/verify-token")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"Token is invalid or expired"}"#)
            .create_async()
            .await
    }
}
