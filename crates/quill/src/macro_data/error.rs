//! 宏观数据错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MacroDataError {
    /// 网络或协议层失败
    #[error("请求失败: {0}")]
    Http(#[from] reqwest::Error),

    /// 数据源返回非 2xx
    #[error("接口返回状态码 {status}: {url}")]
    Status { url: String, status: u16 },

    /// 响应体无法解析
    #[error("解析响应失败: {0}")]
    Parse(String),

    #[error("响应缺少字段: {0}")]
    MissingField(String),

    /// 严格数值列遇到无法转换的值
    #[error("列 {column} 无法转换为数值: {value}")]
    Numeric { column: String, value: String },
}

impl MacroDataError {
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse(reason.into())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }
}

impl From<serde_json::Error> for MacroDataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
