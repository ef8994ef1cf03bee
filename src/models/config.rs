// 库配置结构：缓存、HTTP、日志三部分，均可由 TOML 文件反序列化
use crate::data::codecs::TableFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Chadwick 球员注册表归档
pub const DEFAULT_REGISTER_URL: &str =
    "https://github.com/chadwickbureau/register/archive/refs/heads/master.zip";

/// Lahman（baseballdatabank）归档
pub const DEFAULT_LAHMAN_URL: &str =
    "https://github.com/chadwickbureau/baseballdatabank/archive/master.zip";

/// 库的完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub log: LogConfig,
}

/// 结果缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// 是否启用磁盘缓存（默认关闭）
    #[serde(default)]
    pub enabled: bool,
    /// 缓存目录，注册表文件与 Lahman 解压目录也放在这里
    #[serde(default = "default_cache_dir")]
    pub directory: PathBuf,
    /// 缓存项格式
    #[serde(default)]
    pub format: TableFormat,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: default_cache_dir(),
            format: TableFormat::default(),
        }
    }
}

impl CacheSettings {
    /// 在指定目录启用缓存（Parquet 格式）
    pub fn enabled_at(directory: impl AsRef<Path>) -> Self {
        Self {
            enabled: true,
            directory: directory.as_ref().to_path_buf(),
            format: TableFormat::default(),
        }
    }
}

/// 默认缓存目录 `~/.baseball-data/cache`（无法获取主目录时退回当前目录）
fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".baseball-data")
        .join("cache")
}

/// HTTP 客户端配置
///
/// 所有请求都有上限超时，失败不重试。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// 单次请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 自定义 User-Agent（为空时使用 `baseball-data/<版本>`）
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "default_register_url")]
    pub register_url: String,
    #[serde(default = "default_lahman_url")]
    pub lahman_url: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
            register_url: default_register_url(),
            lahman_url: default_lahman_url(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_register_url() -> String {
    DEFAULT_REGISTER_URL.to_string()
}

fn default_lahman_url() -> String {
    DEFAULT_LAHMAN_URL.to_string()
}

/// 日志级别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// 日志输出目标
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

/// 日志配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub output: LogOutput,
    /// 日志目录（文件输出时使用，默认 `~/.baseball-data/logs`）
    #[serde(default)]
    pub file_path: Option<String>,
}
