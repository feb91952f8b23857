use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use service::catalog::{ListQuery, ListResult, ServiceWithVersions};
use tracing::debug;

use crate::errors::JsonApiError;
use crate::observability::{record_request, LIST_DURATION};
use crate::state::ServerState;

/// 查询参数全部按字符串接收，非法值在映射时忽略
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListServicesParams {
    /// Substring matched against name or description
    pub search: Option<String>,
    /// `name`, `created_at`/`createdAt` or `updated_at`/`updatedAt`
    pub sort_by: Option<String>,
    /// `asc` or `desc`
    pub sort_dir: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Non-numeric or non-positive values become 0, which the service treats as "use the default".
fn lenient_positive(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).filter(|n| *n > 0).unwrap_or(0)
}

impl From<ListServicesParams> for ListQuery {
    fn from(p: ListServicesParams) -> Self {
        ListQuery {
            page: lenient_positive(p.page.as_deref()),
            page_size: lenient_positive(p.page_size.as_deref()),
            search: p.search,
            sort_by: p.sort_by,
            sort_dir: p.sort_dir,
        }
    }
}

fn outcome(res: &Result<impl Sized, JsonApiError>) -> &'static str {
    match res {
        Ok(_) => "ok",
        Err(e) if e.status.is_client_error() => "not_found",
        Err(_) => "error",
    }
}

/// 分页列出服务及其版本
#[utoipa::path(
    get,
    path = "/api/v1/services",
    tag = "services",
    params(ListServicesParams),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ListResultDoc),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn list_services(
    State(state): State<ServerState>,
    Query(params): Query<ListServicesParams>,
) -> Result<Json<ListResult>, JsonApiError> {
    let started = Instant::now();
    let query = ListQuery::from(params);
    let res = state.catalog.list_services(&query).await.map(Json).map_err(JsonApiError::from);
    LIST_DURATION.observe(started.elapsed().as_secs_f64());
    record_request("list", outcome(&res));
    res
}

/// 按 id 获取单个服务
#[utoipa::path(
    get,
    path = "/api/v1/services/{id}",
    tag = "services",
    params(("id" = i64, Path, description = "Service id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ServiceWithVersionsDoc),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn get_service(
    State(state): State<ServerState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ServiceWithVersions>, JsonApiError> {
    // 非整数 id 视为路由不匹配
    let Ok(id) = raw_id.parse::<i64>() else {
        debug!(%raw_id, "non-numeric service id");
        record_request("get", "not_found");
        return Err(JsonApiError::not_found("service not found"));
    };
    let res = state.catalog.get_service_by_id(id).await.map(Json).map_err(JsonApiError::from);
    record_request("get", outcome(&res));
    res
}
