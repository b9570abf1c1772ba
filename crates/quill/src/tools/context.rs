//! 工具调用上下文、定义与结果

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 调用方信息，只用于日志关联
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    pub user: Option<String>,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// `GET /macro/tools` 返回的工具描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// 成功的执行结果；宏观数据工具的 `output` 为 markdown 表格
///
/// 失败统一通过 `ToolError` 返回。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub output: String,
    /// 例如注册表写入的 `elapsed_ms`
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ToolResult {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
