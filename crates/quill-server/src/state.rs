//! 共享状态

use std::sync::Arc;

use quill::config::QuillConfig;
use quill::macro_data::{register_macro_data_tools, MacroDataClient};
use quill::mark::{MarkService, MarkStore, SqliteMarkStore};
use quill::tools::ToolRegistry;

#[derive(Clone)]
pub struct AppState {
    pub mark: MarkService,
    pub tools: Arc<ToolRegistry>,
}

impl AppState {
    pub fn new(store: Arc<dyn MarkStore>, tools: ToolRegistry) -> Self {
        Self {
            mark: MarkService::new(store),
            tools: Arc::new(tools),
        }
    }

    /// 按配置连接数据库并注册宏观数据工具
    pub async fn from_config(config: &QuillConfig) -> anyhow::Result<Self> {
        let store = SqliteMarkStore::connect(&config.database).await?;

        let client = Arc::new(MacroDataClient::new(config.macro_data.clone())?);
        let mut tools = ToolRegistry::new();
        register_macro_data_tools(&mut tools, client);
        tracing::info!(tools = ?tools.tool_names(), "工具注册完成");

        Ok(Self::new(Arc::new(store), tools))
    }
}
