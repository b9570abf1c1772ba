//! 标注模块错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkError {
    #[error("任务不存在")]
    TaskNotFound(i64),

    /// 同一任务下的会话已被标注
    #[error("已经标注过了")]
    AlreadyMarked,

    #[error("action参数错误")]
    InvalidAction(String),

    #[error("参数错误: {0}")]
    InvalidArgument(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
}

impl MarkError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    /// 调用方可修正的错误（非服务端故障）
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Database(_))
    }
}
