//! 标注业务逻辑
//!
//! 每个方法对应一个 `/mark` 接口，只做一两次存储读写。

use std::sync::Arc;

use super::error::MarkError;
use super::store::{MarkStore, Result};
use super::types::{
    LoginUser, MarkData, MarkRecord, MarkTaskCreate, MarkTaskPage, MarkTaskRead, MarkTaskStatus,
    NavAction, NavTarget, NewMarkAppUser, NewMarkRecord, NewMarkTask, User,
};

#[derive(Clone)]
pub struct MarkService {
    store: Arc<dyn MarkStore>,
}

impl MarkService {
    pub fn new(store: Arc<dyn MarkStore>) -> Self {
        Self { store }
    }

    /// 任务列表
    ///
    /// 管理员看全部任务，其他用户只看分配给自己的任务。每个任务附带各标注人的进度。
    pub async fn list(
        &self,
        login_user: &LoginUser,
        status: Option<MarkTaskStatus>,
        page_size: i64,
        page_num: i64,
    ) -> Result<MarkTaskPage> {
        let user_filter = if login_user.is_admin() {
            None
        } else {
            Some(login_user.user_id)
        };
        let (tasks, total) = self
            .store
            .list_tasks(user_filter, status, page_size, page_num)
            .await?;

        let mut list = Vec::with_capacity(tasks.len());
        for task in tasks {
            let mark_process = self.mark_process(task.id).await?;
            list.push(MarkTaskRead { task, mark_process });
        }
        Ok(MarkTaskPage { list, total })
    }

    /// 每个标注人一条 `用户名:数量`，按首次标注先后排列
    async fn mark_process(&self, task_id: i64) -> Result<Vec<String>> {
        let records = self.store.list_records(task_id).await?;
        let mut seen = Vec::new();
        let mut process = Vec::new();
        for record in records {
            if seen.contains(&record.create_id) {
                continue;
            }
            seen.push(record.create_id);
            let count = self.store.count_records(task_id, record.create_id).await?;
            process.push(format!("{}:{}", record.create_user, count));
        }
        Ok(process)
    }

    /// 创建任务：一条主任务 + 应用 × 用户的关联行
    ///
    /// 应用和用户列表按首次出现去重。
    pub async fn create_task(&self, login_user: &LoginUser, req: MarkTaskCreate) -> Result<i64> {
        let mut app_list: Vec<String> = Vec::new();
        for app in req.app_list.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !app_list.iter().any(|a| a == app) {
                app_list.push(app.to_string());
            }
        }
        if app_list.is_empty() {
            return Err(MarkError::invalid_argument("app_list 不能为空"));
        }

        let mut user_list: Vec<i64> = Vec::new();
        for raw in &req.user_list {
            let user = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| MarkError::invalid_argument(format!("无效的用户 id: {}", raw)))?;
            if !user_list.contains(&user) {
                user_list.push(user);
            }
        }
        if user_list.is_empty() {
            return Err(MarkError::invalid_argument("user_list 不能为空"));
        }

        let assignments: Vec<NewMarkAppUser> = app_list
            .iter()
            .flat_map(|app| {
                user_list.iter().map(move |user| NewMarkAppUser {
                    app_id: app.clone(),
                    user_id: *user,
                })
            })
            .collect();
        let row_count = assignments.len();

        let task = self
            .store
            .create_task(
                NewMarkTask {
                    create_user: login_user.user_name.clone(),
                    create_id: login_user.user_id,
                    app_id: app_list.join(","),
                    process_users: user_list
                        .iter()
                        .map(|u| u.to_string())
                        .collect::<Vec<_>>()
                        .join(","),
                },
                assignments,
            )
            .await?;

        tracing::info!(
            task_id = task.id,
            creator = login_user.user_id,
            rows = row_count,
            "创建标注任务"
        );
        Ok(task.id)
    }

    /// 任务下的标注用户
    pub async fn get_user(&self, task_id: i64) -> Result<Vec<User>> {
        let task = self
            .store
            .get_task(task_id)
            .await?
            .ok_or(MarkError::TaskNotFound(task_id))?;

        let mut users = Vec::new();
        for raw in task.process_user_ids() {
            let Ok(user_id) = raw.parse::<i64>() else {
                tracing::warn!(task_id, user = %raw, "任务中的用户 id 无法解析，已跳过");
                continue;
            };
            match self.store.get_user(user_id).await? {
                Some(user) => users.push(user),
                None => tracing::warn!(task_id, user_id, "用户不存在，已跳过"),
            }
        }
        Ok(users)
    }

    /// 标注会话：先查重再插入，记录与任务进入标注中一并提交
    pub async fn mark(&self, login_user: &LoginUser, data: MarkData) -> Result<MarkRecord> {
        if self.store.get_task(data.task_id).await?.is_none() {
            return Err(MarkError::TaskNotFound(data.task_id));
        }
        if self
            .store
            .get_record(data.task_id, &data.session_id)
            .await?
            .is_some()
        {
            return Err(MarkError::AlreadyMarked);
        }

        // 并发时唯一索引兜底，冲突同样映射为 AlreadyMarked
        let record = self
            .store
            .create_record(NewMarkRecord {
                create_user: login_user.user_name.clone(),
                create_id: login_user.user_id,
                session_id: data.session_id,
                task_id: data.task_id,
                status: data.status,
                flow_type: data.flow_type,
            })
            .await?;

        tracing::info!(
            task_id = record.task_id,
            session_id = %record.session_id,
            user_id = login_user.user_id,
            "会话已标注"
        );
        Ok(record)
    }

    pub async fn get_record(&self, chat_id: &str, task_id: i64) -> Result<Option<MarkRecord>> {
        self.store.get_record(task_id, chat_id).await
    }

    /// 上一条 / 下一条待标注会话
    ///
    /// `prev` 返回当前用户最近一次标注的会话，没有记录时返回 `None`；
    /// `next` 返回任务应用下最新的未标注会话，没有时只带 `task_id`。
    pub async fn next(
        &self,
        login_user: &LoginUser,
        action: &str,
        task_id: i64,
    ) -> Result<Option<NavTarget>> {
        let action: NavAction = action.parse()?;
        let mut target = NavTarget {
            task_id,
            chat_id: None,
            flow_type: None,
        };

        match action {
            NavAction::Prev => {
                let Some(record) = self.store.latest_record_by_user(login_user.user_id).await?
                else {
                    return Ok(None);
                };
                match self.store.get_message_by_chat_id(&record.session_id).await? {
                    Some(msg) => {
                        target.chat_id = Some(msg.chat_id);
                        target.flow_type = Some(msg.flow_type);
                    }
                    None => {
                        target.chat_id = Some(record.session_id);
                        target.flow_type = record.flow_type;
                    }
                }
            }
            NavAction::Next => {
                let task = self
                    .store
                    .get_task(task_id)
                    .await?
                    .ok_or(MarkError::TaskNotFound(task_id))?;
                if let Some(msg) = self
                    .store
                    .latest_unmarked_message(task_id, &task.app_ids())
                    .await?
                {
                    target.chat_id = Some(msg.chat_id);
                    target.flow_type = Some(msg.flow_type);
                }
            }
        }
        Ok(Some(target))
    }

    /// 删除任务及其标注记录
    pub async fn delete(&self, task_id: i64) -> Result<()> {
        self.store.delete_task(task_id).await?;
        tracing::info!(task_id, "删除标注任务");
        Ok(())
    }
}
