//! 工具注册表：按名称查找并执行工具

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use super::base::Tool;
use super::context::{ToolContext, ToolDefinition, ToolResult};
use super::error::ToolError;

/// 按名称有序保存，定义列表顺序稳定
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同名工具会被覆盖
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!("工具 {} 已存在，已被覆盖", name);
        }
    }

    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.get_definition()).collect()
    }

    /// 执行工具，成功结果的 metadata 中附带 `elapsed_ms`
    pub async fn execute(
        &self,
        name: &str,
        params: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::not_found(name))?;

        let start = Instant::now();
        let result = tool.execute(params, context).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => tracing::info!(tool = name, user = ?context.user, elapsed_ms, "工具执行完成"),
            Err(e) => {
                tracing::warn!(tool = name, user = ?context.user, elapsed_ms, error = %e, "工具执行失败")
            }
        }

        result.map(|r| r.with_metadata("elapsed_ms", serde_json::json!(elapsed_ms)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "named"
        }

        fn input_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }

        async fn execute(
            &self,
            _params: serde_json::Value,
            _context: &ToolContext,
        ) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::new(self.0))
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("b")));
        registry.register(Arc::new(NamedTool("a")));

        assert_eq!(registry.tool_count(), 2);
        assert!(registry.contains("a"));
        assert_eq!(registry.tool_names(), vec!["a", "b"]);

        let defs = registry.get_definitions();
        assert_eq!(defs[0].name, "a");
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("a")));
        registry.register(Arc::new(NamedTool("a")));
        assert_eq!(registry.tool_count(), 1);
        assert!(registry.unregister("a").is_some());
        assert_eq!(registry.tool_count(), 0);
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry
            .execute("missing", serde_json::json!({}), &ToolContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn test_execute_records_elapsed() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("a")));
        let result = registry
            .execute("a", serde_json::json!({}), &ToolContext::new())
            .await
            .unwrap();
        assert_eq!(result.output, "a");
        assert!(result.metadata.contains_key("elapsed_ms"));
    }
}
