//! 标注存储抽象层
//!
//! 定义 `MarkStore` trait，服务层只依赖此抽象；默认实现为 SQLite
//! (`SqliteMarkStore`)。

use async_trait::async_trait;

use super::error::MarkError;
use super::types::{
    ChatMessage, MarkAppUser, MarkRecord, MarkTask, MarkTaskStatus, NewChatMessage,
    NewMarkAppUser, NewMarkRecord, NewMarkTask, User,
};

pub type Result<T> = std::result::Result<T, MarkError>;

/// 标注任务存储 trait
#[async_trait]
pub trait MarkStore: Send + Sync {
    /// 建表（幂等）
    async fn init_schema(&self) -> Result<()>;

    // ---- 任务 ----

    /// 在同一事务中插入任务及其应用 × 用户关联行，任一行失败则整体回滚
    async fn create_task(
        &self,
        task: NewMarkTask,
        assignments: Vec<NewMarkAppUser>,
    ) -> Result<MarkTask>;

    async fn get_task(&self, id: i64) -> Result<Option<MarkTask>>;

    /// 分页列出任务，按创建顺序倒序
    ///
    /// `user_id` 为 `Some` 时只返回分配给该用户的任务。`page_num` 从 1 开始。
    async fn list_tasks(
        &self,
        user_id: Option<i64>,
        status: Option<MarkTaskStatus>,
        page_size: i64,
        page_num: i64,
    ) -> Result<(Vec<MarkTask>, i64)>;

    /// 删除任务及其关联行和标注记录
    async fn delete_task(&self, id: i64) -> Result<()>;

    // ---- 任务-应用-用户 ----

    async fn list_app_users(&self, task_id: i64) -> Result<Vec<MarkAppUser>>;

    // ---- 标注记录 ----

    /// 插入记录并把任务置为标注中（同一事务）
    ///
    /// 任务不存在返回 `MarkError::TaskNotFound`；同一任务同一会话重复插入返回
    /// `MarkError::AlreadyMarked`。两种情况都不会留下任何写入。
    async fn create_record(&self, record: NewMarkRecord) -> Result<MarkRecord>;

    async fn get_record(&self, task_id: i64, session_id: &str) -> Result<Option<MarkRecord>>;

    /// 任务下全部记录，按标注顺序
    async fn list_records(&self, task_id: i64) -> Result<Vec<MarkRecord>>;

    /// 某用户在某任务下的标注数
    async fn count_records(&self, task_id: i64, create_id: i64) -> Result<i64>;

    /// 某用户最近一次标注
    async fn latest_record_by_user(&self, user_id: i64) -> Result<Option<MarkRecord>>;

    // ---- 平台数据 ----

    async fn get_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn upsert_user(&self, user: User) -> Result<()>;

    async fn insert_message(&self, message: NewChatMessage) -> Result<ChatMessage>;

    /// 会话最新一条消息
    async fn get_message_by_chat_id(&self, chat_id: &str) -> Result<Option<ChatMessage>>;

    /// 指定应用下最新的、尚未在该任务中标注的会话消息
    async fn latest_unmarked_message(
        &self,
        task_id: i64,
        flow_ids: &[String],
    ) -> Result<Option<ChatMessage>>;
}
