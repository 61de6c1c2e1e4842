//! HTTP server for the profile API
//!
//! Routes:
//! - `GET /` service banner
//! - `GET /health` liveness check
//! - `POST /profiles/`, `GET /profiles/?skip=&limit=`
//! - `GET|PUT|DELETE /profiles/:id`
//! - `GET /profiles/:id/history`
//!
//! Collection routes answer with and without the trailing slash. Malformed
//! bodies, query strings and ids are answered with the same `{"detail": ...}`
//! body as lifecycle errors. Lifecycle calls are synchronous store
//! transactions, so handlers run them on the blocking pool.

use super::error::ApiError;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::schemas::{
    HistoryEntryResponse, ListQuery, MessageResponse, ProfileCreate, ProfileResponse,
    ProfileUpdate,
};
use crate::config::{CorsConfig, ServerConfig, StatusTokenPolicy};
use crate::error::ProfileResult;
use crate::models::{ProfileChanges, ProfileId};
use crate::services::{resolve_status, ProfileService};
use crate::Result;
use anyhow::Context;
use axum::{
    extract::State,
    http::HeaderValue,
    routing::get,
    Json, Router,
};
use colored::Colorize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

// =============================================================================
// Application State
// =============================================================================

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: ProfileService,
    pub status_policy: StatusTokenPolicy,
    pub default_page_size: u32,
}

impl AppState {
    pub fn new(service: ProfileService, config: &ServerConfig) -> Self {
        Self {
            service,
            status_policy: config.status_policy,
            default_page_size: config.default_page_size,
        }
    }
}

// =============================================================================
// Server Startup
// =============================================================================

/// Build the router with CORS and request tracing applied
pub fn router(state: AppState, cors: &CorsConfig) -> Result<Router> {
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/profiles", get(list_profiles).post(create_profile))
        .route("/profiles/", get(list_profiles).post(create_profile))
        .route(
            "/profiles/:id",
            get(read_profile).put(update_profile).delete(delete_profile),
        )
        .route("/profiles/:id/history", get(read_history))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors)?),
        )
        .with_state(state);

    Ok(app)
}

fn cors_layer(cors: &CorsConfig) -> Result<CorsLayer> {
    if cors.permissive {
        return Ok(CorsLayer::permissive());
    }

    let origins = cors
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Open the configured store and serve until Ctrl-C
pub async fn start_server(config: &ServerConfig) -> Result<()> {
    let store = config.database.open_store(config.max_page_size)?;
    let service = ProfileService::new(Arc::new(store));
    let app = router(AppState::new(service, config), &config.cors)?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let local_addr = listener.local_addr()?;

    info!(address = %local_addr, database = %config.database, "Server listening");
    println!("{}", format!("✓ Server listening on http://{}", local_addr).green());
    println!("  Profiles: http://{}/profiles/", local_addr);
    println!("  Database: {}", config.database);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

/// Run a lifecycle call on the blocking pool
async fn run_blocking<T, F>(f: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce() -> ProfileResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}

// =============================================================================
// Handlers
// =============================================================================

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Profile service is running"))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn create_profile(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ProfileCreate>,
) -> std::result::Result<Json<ProfileResponse>, ApiError> {
    let service = state.service.clone();
    let profile = run_blocking(move || service.create(body.into())).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

async fn read_profile(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProfileId>,
) -> std::result::Result<Json<ProfileResponse>, ApiError> {
    let service = state.service.clone();
    let profile = run_blocking(move || service.get(id)).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

async fn list_profiles(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> std::result::Result<Json<Vec<ProfileResponse>>, ApiError> {
    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(state.default_page_size);

    let service = state.service.clone();
    let profiles = run_blocking(move || service.list(skip, limit)).await?;
    Ok(Json(profiles.iter().map(ProfileResponse::from).collect()))
}

async fn update_profile(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProfileId>,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> std::result::Result<Json<ProfileResponse>, ApiError> {
    let status = resolve_status(body.status.as_deref(), state.status_policy)?;
    let changes = ProfileChanges {
        name: body.name,
        email: body.email,
        specialty: body.specialty,
        linkedin: body.linkedin,
        status,
    };

    let service = state.service.clone();
    let profile = run_blocking(move || service.update(id, changes)).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

async fn delete_profile(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProfileId>,
) -> std::result::Result<Json<MessageResponse>, ApiError> {
    let service = state.service.clone();
    run_blocking(move || service.delete(id)).await?;
    Ok(Json(MessageResponse::new("Profile deleted")))
}

async fn read_history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProfileId>,
) -> std::result::Result<Json<Vec<HistoryEntryResponse>>, ApiError> {
    let service = state.service.clone();
    let history = run_blocking(move || service.history(id)).await?;
    Ok(Json(history.iter().map(HistoryEntryResponse::from).collect()))
}
