//! 数据层
//!
//! 表格文件的读写与结果缓存，全部为同步磁盘操作。
//!
//! # 模块组织
//!
//! - `error`: 数据层错误类型
//! - `codecs`: CSV / Parquet 表格编解码
//! - `cache`: 缓存键与磁盘结果缓存
//! - `manager`: 统一入口 `DataManager`

pub mod cache;
pub mod codecs;
pub mod error;
pub mod manager;

pub use cache::{CacheKey, ResultCache};
pub use codecs::TableFormat;
pub use error::{DataError, Result};
pub use manager::DataManager;
