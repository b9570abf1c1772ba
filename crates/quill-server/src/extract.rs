//! 登录用户提取
//!
//! 身份由上游网关写入请求头，这里只做读取，不校验令牌。

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use quill::mark::LoginUser;

use crate::response::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_ROLE_HEADER: &str = "x-user-role";

const DEFAULT_ROLE: &str = "user";

/// 需要登录的接口使用的提取器
#[derive(Debug, Clone)]
pub struct CurrentUser(pub LoginUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        login_user_from_headers(&parts.headers).map(CurrentUser)
    }
}

/// 用户名可能含中文，按 UTF-8 宽松解码
fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn login_user_from_headers(headers: &HeaderMap) -> Result<LoginUser, ApiError> {
    let raw_id = header_text(headers, USER_ID_HEADER)
        .ok_or_else(|| ApiError::unauthorized("缺少登录信息"))?;
    let user_id: i64 = raw_id
        .parse()
        .map_err(|_| ApiError::unauthorized("登录信息无效"))?;

    let user_name = header_text(headers, USER_NAME_HEADER).unwrap_or_else(|| raw_id.clone());
    let role = header_text(headers, USER_ROLE_HEADER).unwrap_or_else(|| DEFAULT_ROLE.to_string());

    Ok(LoginUser::new(user_id, user_name, role))
}
