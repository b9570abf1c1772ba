//! Quill - 会话标注与宏观数据工具
//!
//! This crate provides the core functionality behind the `quilld` server:
//! the chat-session annotation workflow and the macro data tools.

pub mod config;
pub mod macro_data;
pub mod mark;
pub mod tools;
