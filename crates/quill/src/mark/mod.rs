//! Mark 模块
//!
//! 会话标注工作流：审核人员领取标注任务，对任务下应用产生的会话逐条打标。
//! - `MarkStore` trait: 可插拔的存储抽象
//! - `SqliteMarkStore`: 默认 SQLite 实现
//! - `MarkService`: 每个接口对应的业务逻辑

mod error;
mod service;
mod sqlite;
mod store;
mod types;

pub use error::MarkError;
pub use service::MarkService;
pub use sqlite::{SqliteMarkStore, DEFAULT_PAGE_SIZE};
pub use store::MarkStore;
pub use types::{
    split_delimited, ChatMessage, LoginUser, MarkAppUser, MarkData, MarkRecord, MarkTask,
    MarkTaskCreate, MarkTaskPage, MarkTaskRead, MarkTaskStatus, NavAction, NavTarget,
    NewChatMessage, NewMarkAppUser, NewMarkRecord, NewMarkTask, User, ADMIN_ROLE,
};
