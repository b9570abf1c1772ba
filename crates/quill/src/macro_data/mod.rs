//! 宏观数据模块
//!
//! 从公开数据门户抓取宏观经济统计表，整理为 markdown 供 Agent 使用：
//! - `client`: HTTP 抓取与解析
//! - `indicator`: 指标目录与列映射
//! - `table`: 轻量表格与 markdown 渲染
//! - `tool`: `Tool` 包装与注册

mod client;
mod error;
mod indicator;
mod table;
mod tool;

pub use client::{parse_jin10_report, parse_jin10_values, MacroDataClient};
pub use error::MacroDataError;
pub use indicator::{
    EastmoneyReport, Indicator, CPI_REPORT, MONEY_SUPPLY_REPORT, PPI_REPORT, RETAIL_REPORT,
    SOCIAL_FINANCING_COLUMNS,
};
pub use table::{convert_value, Cell, ColumnKind, ColumnSource, ColumnSpec, Table};
pub use tool::{register_macro_data_tools, MacroDataTool};
