//! HTTP routes for the analytics service.

use crate::error::ApiError;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use rollcall_analytics::{AnalyticsBundle, AnalyticsQuery, AnalyticsService, CacheStats};
use rollcall_common::RollcallError;
use rollcall_config::Config;
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: Arc<AnalyticsService>,
}

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationResponse {
    pub invalidated_entries: u64,
}

/// Builds the router with tracing and, when enabled, permissive CORS.
pub fn create_router(state: AppState) -> Router {
    let enable_cors = state.config.server.enable_cors;

    let router = Router::new()
        .route("/health", get(health))
        .route("/api/attendance/analytics", get(get_analytics))
        .route(
            "/api/attendance/analytics/cache",
            get(get_cache_stats).delete(invalidate_cache),
        );

    let router = if enable_cors {
        router.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
    } else {
        router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    };

    router.with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn get_analytics(
    State(state): State<AppState>,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|rejection| RollcallError::validation(rejection.body_text()))?;
    let filter = query.into_filter()?;
    let bundle: Arc<AnalyticsBundle> = state.service.analytics(&filter).await?;
    Ok(ApiResponse::ok(&*bundle).into_response())
}

async fn get_cache_stats(State(state): State<AppState>) -> Json<ApiResponse<CacheStats>> {
    ApiResponse::ok(state.service.cache_stats().await)
}

async fn invalidate_cache(State(state): State<AppState>) -> Json<ApiResponse<InvalidationResponse>> {
    let invalidated_entries = state.service.invalidate_cache().await;
    info!(invalidated_entries, "Analytics cache cleared on request");
    ApiResponse::ok(InvalidationResponse {
        invalidated_entries,
    })
}
