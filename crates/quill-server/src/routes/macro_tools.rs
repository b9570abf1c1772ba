//! `/macro/tools` 宏观数据工具接口

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use quill::tools::{ToolContext, ToolDefinition};
use serde_json::Value;

use crate::extract::login_user_from_headers;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(call_tool))
}

async fn list_tools(State(state): State<AppState>) -> ApiResponse<Vec<ToolDefinition>> {
    ApiResponse::ok(state.tools.get_definitions())
}

/// 请求体 `{"query": "..."}` 原样交给工具校验；不要求登录
async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(params): Json<Value>,
) -> ApiResult<String> {
    let mut context = ToolContext::new();
    if let Ok(user) = login_user_from_headers(&headers) {
        context = context.with_user(user.user_name);
    }
    let result = state.tools.execute(&name, params, &context).await?;
    Ok(ApiResponse::ok(result.output))
}
