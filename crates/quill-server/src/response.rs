//! 统一响应封装 `{code, message, data}`
//!
//! 业务错误同样以 HTTP 200 返回，`code = 500`，错误信息同时放在 `message` 和 `data`。
//! 只有缺少登录用户时返回 HTTP 401。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quill::mark::MarkError;
use quill::tools::ToolError;
use serde::Serialize;

pub const SUCCESS_CODE: u16 = 200;
pub const ERROR_CODE: u16 = 500;
pub const SUCCESS_MESSAGE: &str = "SUCCESS";

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: SUCCESS_MESSAGE.to_string(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// 处理器错误
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status: StatusCode,
    code: u16,
    message: String,
}

impl ApiError {
    /// 业务错误：HTTP 200 + code 500
    pub fn business(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            code: ERROR_CODE,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: StatusCode::UNAUTHORIZED.as_u16(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<MarkError> for ApiError {
    fn from(err: MarkError) -> Self {
        if err.is_client_error() {
            tracing::warn!(error = %err, "标注请求失败");
        } else {
            tracing::error!(error = %err, "标注请求出错");
        }
        Self::business(err.to_string())
    }
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        if err.is_client_error() {
            tracing::warn!(error = %err, "工具调用失败");
        } else {
            tracing::error!(error = %err, "工具调用出错");
        }
        Self::business(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse {
            code: self.code,
            message: self.message.clone(),
            data: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
