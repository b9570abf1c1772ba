//! `Tool` trait
//!
//! 每个可被调用的工具提供名称、描述、输入 JSON Schema 和异步执行入口。

use async_trait::async_trait;

use super::context::{ToolContext, ToolDefinition, ToolResult};
use super::error::ToolError;

#[async_trait]
pub trait Tool: Send + Sync {
    /// 注册表中的唯一名称
    fn name(&self) -> &str;

    /// 提供给模型的用途说明
    fn description(&self) -> &str;

    fn input_schema(&self) -> serde_json::Value;

    /// 参数不合法时返回 `ToolError::InvalidParams`，不发起任何请求
    async fn execute(
        &self,
        params: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolResult, ToolError>;

    fn get_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "原样返回 input"
        }

        fn input_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": { "input": { "type": "string" } }
            })
        }

        async fn execute(
            &self,
            params: serde_json::Value,
            _context: &ToolContext,
        ) -> Result<ToolResult, ToolError> {
            let input = params
                .get("input")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::invalid_params("缺少 input"))?;
            Ok(ToolResult::new(input))
        }
    }

    #[test]
    fn test_tool_get_definition() {
        let def = EchoTool.get_definition();
        assert_eq!(def.name, "echo");
        assert_eq!(def.description, "原样返回 input");
        assert_eq!(def.input_schema["type"], "object");
    }

    #[tokio::test]
    async fn test_tool_execute() {
        let ctx = ToolContext::new();
        let result = EchoTool
            .execute(serde_json::json!({"input": "hi"}), &ctx)
            .await
            .unwrap();
        assert_eq!(result.output, "hi");

        let err = EchoTool.execute(serde_json::json!({}), &ctx).await;
        assert!(matches!(err, Err(ToolError::InvalidParams(_))));
    }
}
