use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::authz::{Authorizer, Capability};
use crate::config::{Environment, SecurityConfig};
use crate::database::ProductStore;
use crate::error::ApiError;
use crate::handlers::products;
use crate::middleware::{require_caller, Caller};

/// Collaborators shared by every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub authorizer: Arc<dyn Authorizer>,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ProductStore>,
        authorizer: Arc<dyn Authorizer>,
        jwt_secret: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            authorizer,
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Fail with 403 unless `caller` holds `capability`
    pub async fn authorize(&self, caller: &Caller, capability: Capability) -> Result<(), ApiError> {
        if self.authorizer.can(caller, capability).await? {
            return Ok(());
        }
        tracing::warn!(user_id = caller.id, user = %caller.name, %capability, "Permission denied");
        Err(ApiError::insufficient_permissions())
    }
}

pub fn app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected API
        .merge(product_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn product_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/:product",
            get(products::show)
                .put(products::update)
                .patch(products::update)
                .delete(products::destroy),
        )
        .route_layer(middleware::from_fn_with_state(state, require_caller))
}

/// Permissive in development, otherwise limited to the configured origins
pub fn cors_layer(environment: Environment, security: &SecurityConfig) -> CorsLayer {
    if environment == Environment::Development {
        return CorsLayer::permissive();
    }
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "data": {
            "name": "Product API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health (public)",
                "products": "/api/products[/:product] (bearer token)",
            }
        },
        "message": "Product API is running"
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "data": { "status": "ok", "timestamp": now, "store": "ok" },
                "message": "Healthy"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "data": { "status": "degraded", "timestamp": now, "store": "unavailable" },
                    "message": "Store unavailable"
                })),
            )
        }
    }
}
