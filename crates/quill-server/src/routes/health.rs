use axum::routing::get;
use axum::Router;

use crate::response::ApiResponse;
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> ApiResponse<&'static str> {
    ApiResponse::ok("ok")
}
