//! 标注任务数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::MarkError;

/// 标注任务状态，序列化为整数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(into = "i32", try_from = "i32")]
#[repr(i32)]
pub enum MarkTaskStatus {
    /// 未开始
    Default = 1,
    /// 标注中
    Ing = 2,
    /// 已完成
    Done = 3,
}

impl From<MarkTaskStatus> for i32 {
    fn from(status: MarkTaskStatus) -> Self {
        status as i32
    }
}

impl TryFrom<i32> for MarkTaskStatus {
    type Error = MarkError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MarkTaskStatus::Default),
            2 => Ok(MarkTaskStatus::Ing),
            3 => Ok(MarkTaskStatus::Done),
            other => Err(MarkError::invalid_argument(format!("未知任务状态 {}", other))),
        }
    }
}

/// 将逗号分隔的字符串拆成列表，去掉空段
pub fn split_delimited(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 标注任务：一组应用 × 一组用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarkTask {
    pub id: i64,
    pub create_user: String,
    pub create_id: i64,
    /// 逗号分隔的应用 id
    pub app_id: String,
    /// 逗号分隔的标注用户 id
    pub process_users: String,
    pub status: MarkTaskStatus,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl MarkTask {
    pub fn app_ids(&self) -> Vec<String> {
        split_delimited(&self.app_id)
    }

    pub fn process_user_ids(&self) -> Vec<String> {
        split_delimited(&self.process_users)
    }
}

/// 新建任务时的字段
#[derive(Debug, Clone, PartialEq)]
pub struct NewMarkTask {
    pub create_user: String,
    pub create_id: i64,
    pub app_id: String,
    pub process_users: String,
}

/// 列表返回：任务 + 各用户标注进度
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkTaskRead {
    #[serde(flatten)]
    pub task: MarkTask,
    /// `用户名:已标注数`
    pub mark_process: Vec<String>,
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkTaskPage {
    pub list: Vec<MarkTaskRead>,
    pub total: i64,
}

/// 一个用户对一个会话的标注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarkRecord {
    pub id: i64,
    pub create_user: String,
    pub create_id: i64,
    pub session_id: String,
    pub task_id: i64,
    pub status: Option<i32>,
    pub flow_type: Option<String>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMarkRecord {
    pub create_user: String,
    pub create_id: i64,
    pub session_id: String,
    pub task_id: i64,
    pub status: Option<i32>,
    pub flow_type: Option<String>,
}

/// 任务、应用、用户的多对多关系
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarkAppUser {
    pub id: i64,
    pub task_id: i64,
    pub app_id: String,
    pub user_id: i64,
    pub create_id: i64,
    pub create_time: DateTime<Utc>,
}

/// 新任务的一条分配，任务 id 和创建人由存储层随任务一起写入
#[derive(Debug, Clone, PartialEq)]
pub struct NewMarkAppUser {
    pub app_id: String,
    pub user_id: i64,
}

/// 平台用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub user_name: String,
    pub role: String,
}

/// 平台会话消息（只保留标注流程需要的字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub chat_id: String,
    pub flow_id: String,
    pub flow_type: String,
    pub user_id: Option<i64>,
    pub message: String,
    pub create_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChatMessage {
    pub chat_id: String,
    pub flow_id: String,
    pub flow_type: String,
    pub user_id: Option<i64>,
    pub message: String,
}

/// 当前登录用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginUser {
    pub user_id: i64,
    pub user_name: String,
    pub role: String,
}

pub const ADMIN_ROLE: &str = "admin";

impl LoginUser {
    pub fn new(user_id: i64, user_name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// 创建任务请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkTaskCreate {
    pub app_list: Vec<String>,
    pub user_list: Vec<String>,
}

/// 标注请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkData {
    pub task_id: i64,
    pub session_id: String,
    #[serde(default)]
    pub status: Option<i32>,
    /// flow / assistant
    #[serde(default)]
    pub flow_type: Option<String>,
}

/// 上一条 / 下一条
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Prev,
    Next,
}

impl FromStr for NavAction {
    type Err = MarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev" => Ok(NavAction::Prev),
            "next" => Ok(NavAction::Next),
            other => Err(MarkError::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for NavAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavAction::Prev => write!(f, "prev"),
            NavAction::Next => write!(f, "next"),
        }
    }
}

/// 导航结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavTarget {
    pub task_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_type: Option<String>,
}
