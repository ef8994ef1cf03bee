//! 缓存键
//!
//! 缓存键由抓取函数名与其全部参数决定：
//! - 位置参数按顺序编码（顺序敏感）
//! - 关键字参数按名称排序后编码（与传入顺序无关）
//! - 规范 JSON 串经 SHA-256 得到摘要
//!
//! 调用方应在构造键之前补全默认参数，使“相同有效参数”得到相同的键。
//!
//! # 使用示例
//!
//! ```rust
//! use crate::data::cache::CacheKey;
//!
//! let key = CacheKey::builder("team_game_logs")
//!     .arg(2019)?
//!     .arg("NYY")?
//!     .kwarg("log_type", "batting")?
//!     .build();
//! println!("{key}"); // team_game_logs-<sha256>
//! ```

use crate::data::Result;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// 派生出的缓存键
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CacheKey {
    /// 文件名安全的函数名前缀
    function: String,
    /// 规范参数串的 SHA-256（十六进制）
    digest: String,
}

impl CacheKey {
    /// 开始构造某个函数的缓存键
    pub fn builder(function: &str) -> CacheKeyBuilder {
        CacheKeyBuilder {
            function: function.to_string(),
            args: Vec::new(),
            kwargs: BTreeMap::new(),
        }
    }

    /// 直接由函数名、位置参数和关键字参数计算缓存键
    pub fn compute(function: &str, args: &[Value], kwargs: &BTreeMap<String, Value>) -> Self {
        let canonical = serde_json::json!({
            "function": function,
            "args": args,
            "kwargs": kwargs,
        })
        .to_string();

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let digest = hasher.finalize();

        Self {
            function: sanitize_function_name(function),
            digest: format!("{digest:x}"),
        }
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// 文件名主干（不含后缀）
    pub fn file_stem(&self) -> String {
        format!("{}-{}", self.function, self.digest)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.function, self.digest)
    }
}

/// 缓存键构造器
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    function: String,
    args: Vec<Value>,
    kwargs: BTreeMap<String, Value>,
}

impl CacheKeyBuilder {
    /// 追加位置参数
    pub fn arg<T: Serialize>(mut self, value: T) -> Result<Self> {
        self.args.push(serde_json::to_value(value)?);
        Ok(self)
    }

    /// 设置关键字参数（同名覆盖）
    pub fn kwarg<T: Serialize>(mut self, name: &str, value: T) -> Result<Self> {
        self.kwargs
            .insert(name.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn build(self) -> CacheKey {
        CacheKey::compute(&self.function, &self.args, &self.kwargs)
    }
}

/// 只保留 `[A-Za-z0-9_]`，其他字符替换为 `_`
fn sanitize_function_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "fn".to_string()
    } else {
        cleaned
    }
}
