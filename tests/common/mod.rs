#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use product_api::auth::{generate_jwt, Claims};
use product_api::authz::{Authorizer, GrantedCapabilities};
use product_api::database::MemoryProductStore;
use product_api::{app, AppState};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

pub const SECRET: &str = "integration-test-secret";

pub const VIEW: &str = "view products";
pub const CREATE: &str = "create products";
pub const EDIT: &str = "edit products";
pub const DELETE: &str = "delete products";
pub const ALL: [&str; 4] = [VIEW, CREATE, EDIT, DELETE];

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryProductStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Serve the router on a free port inside the current test runtime
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(Arc::new(GrantedCapabilities)).await
    }

    pub async fn spawn_with(authorizer: Arc<dyn Authorizer>) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryProductStore::new());
        let state = AppState::new(store.clone(), authorizer, SECRET);
        let router = app(state, CorsLayer::permissive());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });

        let server = Self {
            port,
            base_url,
            store,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a product directly through the API with a fully privileged caller
    pub async fn seed(&self, name: &str, price: f64, stock: i64) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/api/products"))
            .bearer_auth(token(99, &ALL))
            .json(&json!({ "name": name, "price": price, "stock": stock }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "seed failed: {}", res.status());
        let body = res.json::<Value>().await?;
        Ok(body["data"].clone())
    }
}

pub fn token(user_id: i64, permissions: &[&str]) -> String {
    let claims = Claims::new(
        user_id,
        format!("user-{}", user_id),
        permissions.iter().map(|p| p.to_string()).collect(),
        1,
    )
    .expect("claims");
    generate_jwt(&claims, SECRET).expect("token")
}
