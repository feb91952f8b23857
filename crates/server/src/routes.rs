pub mod auth;
pub mod services;

use std::time::Duration;

use axum::{middleware, routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::observability::encode_metrics;
use crate::openapi::ApiDoc;
use crate::state::ServerState;

/// 健康检查
#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    encode_metrics()
}

/// Build the application router: public routes, role-guarded catalog routes and docs.
///
/// `request_timeout` bounds each request; an elapsed request answers 408 and the
/// in-flight query future is dropped.
pub fn build_router(state: ServerState, cors: CorsLayer, request_timeout: Option<Duration>) -> Router {
    // Public routes (health + metrics)
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    // Catalog routes: admin 或 viewer 角色
    let api = Router::new()
        .route("/api/v1/services", get(services::list_services))
        .route("/api/v1/services/:id", get(services::get_service))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_catalog_reader));

    let docs = SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    let app = public.merge(api).with_state(state).merge(docs);
    let app = match request_timeout {
        Some(limit) => app.layer(TimeoutLayer::new(limit)),
        None => app,
    };

    app.layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
