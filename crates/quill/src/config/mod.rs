//! 配置模块
//!
//! 配置按以下顺序合并，后者覆盖前者：
//! 1. 内置默认值
//! 2. TOML 配置文件（可选）
//! 3. 环境变量 `QUILL__<SECTION>__<KEY>`，例如 `QUILL__SERVER__PORT=8080`

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub use config::ConfigError;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "QUILL";

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "quill.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QuillConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub macro_data: MacroDataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP 监听配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    7860
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// sqlx 连接串，如 `sqlite://quill.db` 或 `sqlite::memory:`
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "sqlite://quill.db".to_string()
}
fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// 宏观数据源配置
///
/// 各 base 地址可替换，便于测试或走内部镜像。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MacroDataConfig {
    /// 请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_mofcom_base")]
    pub mofcom_base: String,
    #[serde(default = "default_jin10_cdn_base")]
    pub jin10_cdn_base: String,
    #[serde(default = "default_jin10_api_base")]
    pub jin10_api_base: String,
    #[serde(default = "default_eastmoney_base")]
    pub eastmoney_base: String,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_mofcom_base() -> String {
    "http://data.mofcom.gov.cn".to_string()
}
fn default_jin10_cdn_base() -> String {
    "https://cdn.jin10.com".to_string()
}
fn default_jin10_api_base() -> String {
    "https://datacenter-api.jin10.com".to_string()
}
fn default_eastmoney_base() -> String {
    "https://datacenter-web.eastmoney.com".to_string()
}

impl Default for MacroDataConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            mofcom_base: default_mofcom_base(),
            jin10_cdn_base: default_jin10_cdn_base(),
            jin10_api_base: default_jin10_api_base(),
            eastmoney_base: default_eastmoney_base(),
        }
    }
}

impl MacroDataConfig {
    /// 所有数据源指向同一个地址（测试用）
    pub fn with_single_base(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            mofcom_base: base.clone(),
            jin10_cdn_base: base.clone(),
            jin10_api_base: base.clone(),
            eastmoney_base: base,
            ..Default::default()
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// 默认过滤级别，`RUST_LOG` 优先
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 输出 JSON 格式
    #[serde(default)]
    pub json: bool,
    /// 日志文件目录，为空时只输出到 stdout
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl QuillConfig {
    /// 加载配置
    ///
    /// `path` 为 `None` 时尝试当前目录下的 `quill.toml`（不存在则忽略）；
    /// 显式指定的文件必须存在。
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => File::from(p).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 从 TOML 字符串加载（不读环境变量）
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = QuillConfig::default();
        assert_eq!(cfg.server.bind_address(), "127.0.0.1:7860");
        assert_eq!(cfg.database.max_connections, 5);
        assert_eq!(cfg.macro_data.timeout_secs, 30);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.logging.dir.is_none());
    }

    #[test]
    fn test_from_toml_partial() {
        let cfg = QuillConfig::from_toml_str(
            r#"
            [server]
            port = 9000

            [macro_data]
            eastmoney_base = "http://127.0.0.1:1234"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.macro_data.eastmoney_base, "http://127.0.0.1:1234");
        assert_eq!(cfg.macro_data.mofcom_base, "http://data.mofcom.gov.cn");
    }

    #[test]
    #[serial]
    fn test_load_file_then_env_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 9100\n[database]\nurl = \"sqlite::memory:\"").unwrap();

        temp_env::with_var("QUILL__SERVER__PORT", Some("9200"), || {
            let cfg = QuillConfig::load(Some(file.path())).unwrap();
            assert_eq!(cfg.server.port, 9200);
            assert_eq!(cfg.database.url, "sqlite::memory:");
        });
    }

    #[test]
    #[serial]
    fn test_load_missing_explicit_file_fails() {
        let result = QuillConfig::load(Some(Path::new("/nonexistent/quill.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_single_base() {
        let cfg = MacroDataConfig::with_single_base("http://mock");
        assert_eq!(cfg.mofcom_base, "http://mock");
        assert_eq!(cfg.jin10_api_base, "http://mock");
        assert_eq!(cfg.timeout_secs, 30);
    }
}
