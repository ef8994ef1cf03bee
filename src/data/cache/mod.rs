//! 结果缓存
//!
//! - `key`: 由函数名与参数派生的确定性缓存键
//! - `result_cache`: 基于磁盘的表格结果缓存（CSV / Parquet）

pub mod key;
pub mod result_cache;

pub use key::{CacheKey, CacheKeyBuilder};
pub use result_cache::{CacheEntryInfo, ResultCache};
