//! `MarkStore` 的 SQLite 实现（sqlx）

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};

use super::error::MarkError;
use super::store::{MarkStore, Result};
use super::types::{
    ChatMessage, MarkAppUser, MarkRecord, MarkTask, MarkTaskStatus, NewChatMessage,
    NewMarkAppUser, NewMarkRecord, NewMarkTask, User,
};
use crate::config::DatabaseConfig;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS mark_task (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        create_user TEXT NOT NULL,
        create_id INTEGER NOT NULL,
        app_id TEXT NOT NULL,
        process_users TEXT NOT NULL,
        status INTEGER NOT NULL DEFAULT 1,
        create_time TEXT NOT NULL,
        update_time TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS mark_app_user (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        task_id INTEGER NOT NULL,
        app_id TEXT NOT NULL,
        user_id INTEGER NOT NULL,
        create_id INTEGER NOT NULL,
        create_time TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_mark_app_user_user ON mark_app_user (user_id, task_id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_mark_app_user ON mark_app_user (task_id, app_id, user_id)",
    r#"CREATE TABLE IF NOT EXISTS mark_record (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        create_user TEXT NOT NULL,
        create_id INTEGER NOT NULL,
        session_id TEXT NOT NULL,
        task_id INTEGER NOT NULL,
        status INTEGER,
        flow_type TEXT,
        create_time TEXT NOT NULL,
        update_time TEXT NOT NULL
    )"#,
    // 同一任务下一个会话只能有一条标注
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_mark_record_task_session ON mark_record (task_id, session_id)",
    "CREATE INDEX IF NOT EXISTS idx_mark_record_creator ON mark_record (create_id, id)",
    r#"CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY,
        user_name TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user'
    )"#,
    r#"CREATE TABLE IF NOT EXISTS chat_message (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        chat_id TEXT NOT NULL,
        flow_id TEXT NOT NULL,
        flow_type TEXT NOT NULL,
        user_id INTEGER,
        message TEXT NOT NULL DEFAULT '',
        create_time TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_chat_message_chat ON chat_message (chat_id)",
    "CREATE INDEX IF NOT EXISTS idx_chat_message_flow ON chat_message (flow_id, id)",
];

const TASK_COLUMNS: &str =
    "id, create_user, create_id, app_id, process_users, status, create_time, update_time";

const RECORD_COLUMNS: &str =
    "id, create_user, create_id, session_id, task_id, status, flow_type, create_time, update_time";

const MESSAGE_COLUMNS: &str = "id, chat_id, flow_id, flow_type, user_id, message, create_time";

/// 默认每页条数，非法的 page_size 回落到此值
pub const DEFAULT_PAGE_SIZE: i64 = 10;

fn map_insert_error(err: sqlx::Error) -> MarkError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return MarkError::AlreadyMarked;
        }
    }
    MarkError::Database(err)
}

#[derive(Clone)]
pub struct SqliteMarkStore {
    pool: SqlitePool,
}

impl SqliteMarkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 按配置连接并建表
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let is_memory = config.url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        // 内存库每个连接各自独立，只能用单连接且不能被回收
        let pool_options = if is_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self::new(pool);
        store.init_schema().await?;
        tracing::info!(url = %config.url, "标注数据库已就绪");
        Ok(store)
    }

    /// 内存库，测试用
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
    }
}

#[async_trait]
impl MarkStore for SqliteMarkStore {
    async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn create_task(
        &self,
        task: NewMarkTask,
        assignments: Vec<NewMarkAppUser>,
    ) -> Result<MarkTask> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            "INSERT INTO mark_task (create_user, create_id, app_id, process_users, status, create_time, update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.create_user)
        .bind(task.create_id)
        .bind(&task.app_id)
        .bind(&task.process_users)
        .bind(MarkTaskStatus::Default)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for row in &assignments {
            sqlx::query(
                "INSERT INTO mark_app_user (task_id, app_id, user_id, create_id, create_time) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&row.app_id)
            .bind(row.user_id)
            .bind(task.create_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let sql = format!("SELECT {} FROM mark_task WHERE id = ?", TASK_COLUMNS);
        let created = sqlx::query_as::<_, MarkTask>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn get_task(&self, id: i64) -> Result<Option<MarkTask>> {
        let sql = format!("SELECT {} FROM mark_task WHERE id = ?", TASK_COLUMNS);
        Ok(sqlx::query_as::<_, MarkTask>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_tasks(
        &self,
        user_id: Option<i64>,
        status: Option<MarkTaskStatus>,
        page_size: i64,
        page_num: i64,
    ) -> Result<(Vec<MarkTask>, i64)> {
        let page_size = if page_size < 1 { DEFAULT_PAGE_SIZE } else { page_size };
        let offset = (page_num.max(1) - 1).saturating_mul(page_size);

        const FILTER: &str = "WHERE (?1 IS NULL OR id IN (SELECT task_id FROM mark_app_user WHERE user_id = ?1)) \
                              AND (?2 IS NULL OR status = ?2)";

        let sql = format!(
            "SELECT {} FROM mark_task {} ORDER BY id DESC LIMIT ?3 OFFSET ?4",
            TASK_COLUMNS, FILTER
        );
        let tasks = sqlx::query_as::<_, MarkTask>(&sql)
            .bind(user_id)
            .bind(status)
            .bind(page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM mark_task {}", FILTER);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(user_id)
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok((tasks, total))
    }

    async fn delete_task(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM mark_record WHERE task_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM mark_app_user WHERE task_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM mark_task WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_app_users(&self, task_id: i64) -> Result<Vec<MarkAppUser>> {
        Ok(sqlx::query_as::<_, MarkAppUser>(
            "SELECT id, task_id, app_id, user_id, create_id, create_time \
             FROM mark_app_user WHERE task_id = ? ORDER BY id",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_record(&self, record: NewMarkRecord) -> Result<MarkRecord> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // 先推进任务状态，任务不存在时不写记录
        let updated = sqlx::query("UPDATE mark_task SET status = ?, update_time = ? WHERE id = ?")
            .bind(MarkTaskStatus::Ing)
            .bind(now)
            .bind(record.task_id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(MarkError::TaskNotFound(record.task_id));
        }

        let id = sqlx::query(
            "INSERT INTO mark_record (create_user, create_id, session_id, task_id, status, flow_type, create_time, update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.create_user)
        .bind(record.create_id)
        .bind(&record.session_id)
        .bind(record.task_id)
        .bind(record.status)
        .bind(&record.flow_type)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_insert_error)?
        .last_insert_rowid();

        let sql = format!("SELECT {} FROM mark_record WHERE id = ?", RECORD_COLUMNS);
        let created = sqlx::query_as::<_, MarkRecord>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn get_record(&self, task_id: i64, session_id: &str) -> Result<Option<MarkRecord>> {
        let sql = format!(
            "SELECT {} FROM mark_record WHERE task_id = ? AND session_id = ?",
            RECORD_COLUMNS
        );
        Ok(sqlx::query_as::<_, MarkRecord>(&sql)
            .bind(task_id)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_records(&self, task_id: i64) -> Result<Vec<MarkRecord>> {
        let sql = format!(
            "SELECT {} FROM mark_record WHERE task_id = ? ORDER BY id",
            RECORD_COLUMNS
        );
        Ok(sqlx::query_as::<_, MarkRecord>(&sql)
            .bind(task_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_records(&self, task_id: i64, create_id: i64) -> Result<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM mark_record WHERE task_id = ? AND create_id = ?")
                .bind(task_id)
                .bind(create_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn latest_record_by_user(&self, user_id: i64) -> Result<Option<MarkRecord>> {
        let sql = format!(
            "SELECT {} FROM mark_record WHERE create_id = ? ORDER BY id DESC LIMIT 1",
            RECORD_COLUMNS
        );
        Ok(sqlx::query_as::<_, MarkRecord>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT user_id, user_name, role FROM users WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert_user(&self, user: User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (user_id, user_name, role) VALUES (?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET user_name = excluded.user_name, role = excluded.role",
        )
        .bind(user.user_id)
        .bind(&user.user_name)
        .bind(&user.role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_message(&self, message: NewChatMessage) -> Result<ChatMessage> {
        let id = sqlx::query(
            "INSERT INTO chat_message (chat_id, flow_id, flow_type, user_id, message, create_time) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.chat_id)
        .bind(&message.flow_id)
        .bind(&message.flow_type)
        .bind(message.user_id)
        .bind(&message.message)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        let sql = format!("SELECT {} FROM chat_message WHERE id = ?", MESSAGE_COLUMNS);
        Ok(sqlx::query_as::<_, ChatMessage>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_message_by_chat_id(&self, chat_id: &str) -> Result<Option<ChatMessage>> {
        let sql = format!(
            "SELECT {} FROM chat_message WHERE chat_id = ? ORDER BY id DESC LIMIT 1",
            MESSAGE_COLUMNS
        );
        Ok(sqlx::query_as::<_, ChatMessage>(&sql)
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn latest_unmarked_message(
        &self,
        task_id: i64,
        flow_ids: &[String],
    ) -> Result<Option<ChatMessage>> {
        if flow_ids.is_empty() {
            return Ok(None);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM chat_message WHERE flow_id IN (",
            MESSAGE_COLUMNS
        ));
        let mut separated = builder.separated(", ");
        for flow_id in flow_ids {
            separated.push_bind(flow_id);
        }
        separated.push_unseparated(
            ") AND chat_id NOT IN (SELECT session_id FROM mark_record WHERE task_id = ",
        );
        builder.push_bind(task_id);
        builder.push(") ORDER BY id DESC LIMIT 1");

        Ok(builder
            .build_query_as::<ChatMessage>()
            .fetch_optional(&self.pool)
            .await?)
    }
}
