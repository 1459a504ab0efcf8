//! itsfood administration backend
//!
//! Order lifecycle and reconciliation engine for corporate meal orders,
//! served over an axum HTTP API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod common;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod notifications;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{extract::FromRef, http::HeaderValue, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::auth::{AuthConfig, AuthService};
use crate::notifications::NotificationDispatcher;
use crate::repositories::OrderStore;
use crate::services::{EngineSettings, OrderEngine};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub engine: OrderEngine,
    pub auth: AuthService,
    pub environment: Arc<str>,
}

impl AppState {
    /// Wires the engine and the auth service around one store.
    pub fn new(
        config: &config::AppConfig,
        store: Arc<dyn OrderStore>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            engine: OrderEngine::new(
                store.clone(),
                notifications,
                EngineSettings::from(config),
            ),
            auth: AuthService::new(AuthConfig::from(config), store),
            environment: Arc::from(config.environment.as_str()),
        }
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Success form of the response envelope.
///
/// `errors` is empty on plain success; listings put their paging
/// advisories there.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: String,
    pub errors: Vec<String>,
    pub result: Option<T>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(result: T, description: impl Into<String>) -> Self {
        Self::with_advisories(result, Vec::new(), description)
    }

    pub fn with_advisories(
        result: T,
        advisories: Vec<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            status: "success".to_string(),
            errors: advisories,
            result: Some(result),
            description: description.into(),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<axum::Json<ApiResponse<T>>, errors::ServiceError>;

fn cors_layer(config: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        ::tracing::info!("no CORS origins configured, allowing any origin");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// The complete HTTP application: health/status, `/api/v1`, Swagger UI and
/// the shared layers.
pub fn build_router(state: AppState, config: &config::AppConfig) -> Router {
    Router::new()
        .merge(handlers::health::health_routes())
        .nest("/api/v1", handlers::api_v1_routes())
        .with_state(state)
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http().make_span_with(crate::tracing::RequestSpanMaker))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors_layer(config))
        // Outermost so every layer above runs inside the request id scope
        .layer(axum::middleware::from_fn(
            crate::tracing::request_id_middleware,
        ))
}
