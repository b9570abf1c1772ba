//! 宏观数据工具：把每个指标包装为可供 Agent 调用的 `Tool`

use std::sync::Arc;

use async_trait::async_trait;

use super::client::MacroDataClient;
use super::indicator::Indicator;
use crate::tools::{Tool, ToolContext, ToolError, ToolRegistry, ToolResult};

pub struct MacroDataTool {
    indicator: Indicator,
    client: Arc<MacroDataClient>,
}

impl MacroDataTool {
    pub fn new(indicator: Indicator, client: Arc<MacroDataClient>) -> Self {
        Self { indicator, client }
    }
}

#[async_trait]
impl Tool for MacroDataTool {
    fn name(&self) -> &str {
        self.indicator.name()
    }

    fn description(&self) -> &str {
        self.indicator.description()
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "查询内容，当前数据源不使用"
                }
            }
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _context: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        match params.get("query") {
            None | Some(serde_json::Value::Null) | Some(serde_json::Value::String(_)) => {}
            Some(_) => return Err(ToolError::invalid_params("query 必须是字符串")),
        }

        let markdown = self.client.fetch(self.indicator).await?;
        Ok(ToolResult::new(markdown))
    }
}

/// 注册全部宏观数据工具
pub fn register_macro_data_tools(registry: &mut ToolRegistry, client: Arc<MacroDataClient>) {
    for indicator in Indicator::ALL {
        registry.register(Arc::new(MacroDataTool::new(indicator, client.clone())));
    }
}
