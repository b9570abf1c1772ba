// =============================================================================
// Tool System Module
// =============================================================================
//
// - Tool trait and base types
// - Tool registry for looking tools up by name

pub mod base;
pub mod context;
pub mod error;
pub mod registry;

pub use base::Tool;
pub use context::{ToolContext, ToolDefinition, ToolResult};
pub use error::ToolError;
pub use registry::ToolRegistry;
