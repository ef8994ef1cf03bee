// lib.rs - 棒球数据访问库

pub mod core; // 错误类型、HTTP、日志
pub mod data; // 表格编解码与结果缓存
pub mod models;
pub mod services; // 球员查询、Lahman 数据库
pub mod utils;

pub use models::*;

pub use data::cache::{CacheEntryInfo, CacheKey, CacheKeyBuilder, ResultCache};
pub use data::codecs::{read_table, write_table, TableFormat};
pub use data::{DataError, DataManager};

pub use models::player::InvalidKeyType;
pub use services::archive::ZipBundle;
pub use services::lahman::{LahmanDatabase, LahmanTable};
pub use services::player_lookup::{ChadwickRegister, PlayerResolver, RegistrySource};

pub use utils::config::{config_path, load_config};

// 重新导出常用类型
pub use anyhow::{Context, Result};

pub use core::{
    build_http_client, fetch_bytes, init_logger, update_log_level, validate_url, AppError,
    AppResult,
};
