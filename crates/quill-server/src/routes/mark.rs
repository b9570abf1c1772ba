//! `/mark` 标注任务接口

use axum::extract::{Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use quill::mark::{
    MarkData, MarkRecord, MarkTaskCreate, MarkTaskPage, MarkTaskStatus, NavTarget, User,
    DEFAULT_PAGE_SIZE,
};
use serde::Deserialize;

use crate::extract::CurrentUser;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

const OK: &str = "ok";

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/list", get(list))
        .route("/create_task", post(create_task))
        .route("/get_user", get(get_user))
        .route("/mark", post(mark))
        .route("/get_record", get(get_record))
        .route("/next", get(next))
        .route("/del", delete(del_task))
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_page_num() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<i32>,
    #[serde(default = "default_page_size")]
    page_size: i64,
    #[serde(default = "default_page_num")]
    page_num: i64,
}

#[derive(Debug, Deserialize)]
struct TaskIdQuery {
    task_id: i64,
}

#[derive(Debug, Deserialize)]
struct RecordQuery {
    chat_id: String,
    task_id: i64,
}

#[derive(Debug, Deserialize)]
struct NextQuery {
    action: String,
    task_id: i64,
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<MarkTaskPage> {
    let status = query.status.map(MarkTaskStatus::try_from).transpose()?;
    let page = state
        .mark
        .list(&user, status, query.page_size, query.page_num)
        .await?;
    Ok(ApiResponse::ok(page))
}

async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<MarkTaskCreate>,
) -> ApiResult<&'static str> {
    state.mark.create_task(&user, req).await?;
    Ok(ApiResponse::ok(OK))
}

async fn get_user(
    State(state): State<AppState>,
    Query(query): Query<TaskIdQuery>,
) -> ApiResult<Vec<User>> {
    let users = state.mark.get_user(query.task_id).await?;
    Ok(ApiResponse::ok(users))
}

async fn mark(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(data): Json<MarkData>,
) -> ApiResult<&'static str> {
    state.mark.mark(&user, data).await?;
    Ok(ApiResponse::ok(OK))
}

async fn get_record(
    State(state): State<AppState>,
    Query(query): Query<RecordQuery>,
) -> ApiResult<Option<MarkRecord>> {
    let record = state.mark.get_record(&query.chat_id, query.task_id).await?;
    Ok(ApiResponse::ok(record))
}

async fn next(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<NextQuery>,
) -> ApiResult<Option<NavTarget>> {
    let target = state.mark.next(&user, &query.action, query.task_id).await?;
    Ok(ApiResponse::ok(target))
}

async fn del_task(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<TaskIdQuery>,
) -> ApiResult<&'static str> {
    state.mark.delete(query.task_id).await?;
    Ok(ApiResponse::ok(OK))
}
