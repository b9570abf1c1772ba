//! quilld - 标注服务与宏观数据工具的 HTTP 服务
//!
//! 路由、统一响应封装、登录用户提取和日志初始化。

pub mod extract;
pub mod logging;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
