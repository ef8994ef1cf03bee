//! 磁盘结果缓存
//!
//! 包装各数据源的抓取函数：
//! - 命中：直接读取 `{directory}/{key}.{ext}` 并返回
//! - 未命中：调用生成函数，持久化结果后返回
//! - 缓存文件损坏：记录警告并按未命中处理
//!
//! 缓存项没有 TTL，只能通过 [`ResultCache::purge`] 显式清除。
//!
//! 写入流程为「同目录临时文件 → rename」，期间持有缓存目录的 `fs2` 排他锁，
//! 其他进程只会看到完整的旧文件或完整的新文件。整个目录只有一个锁文件
//! `.result-cache.lock`，不会随缓存键增多。
//!
//! # 使用示例
//!
//! ```rust
//! use crate::data::cache::{CacheKey, ResultCache};
//! use crate::models::CacheSettings;
//!
//! let cache = ResultCache::new(CacheSettings::enabled_at("/tmp/bb-cache"));
//! let key = CacheKey::builder("top_prospects").arg("NYY")?.build();
//! let table = cache.fetch(&key, || async { fetch_prospects("NYY").await }).await?;
//! ```

use super::CacheKey;
use crate::data::codecs::{self, TableFormat};
use crate::data::{DataError, Result};
use crate::models::{CacheSettings, Table};
use chrono::{DateTime, Local};
use fs2::FileExt;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, File};
use std::future::Future;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 缓存文件名主干格式：`{函数名}-{sha256}`
static ENTRY_STEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+-[0-9a-f]{64}$").expect("缓存文件名正则无效"));

/// 缓存目录内共用的写锁文件
pub const LOCK_FILE_NAME: &str = ".result-cache.lock";

/// 缓存项信息（用于列表展示）
#[derive(Debug, Clone)]
pub struct CacheEntryInfo {
    /// 文件名主干（即缓存键）
    pub key: String,
    pub format: TableFormat,
    /// 文件大小（字节）
    pub size: u64,
    pub modified: DateTime<Local>,
    pub path: PathBuf,
}

/// 磁盘结果缓存
#[derive(Debug, Clone)]
pub struct ResultCache {
    settings: CacheSettings,
}

impl ResultCache {
    /// 创建缓存（配置在构造后不再变化）
    pub fn new(settings: CacheSettings) -> Self {
        Self { settings }
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    pub fn directory(&self) -> &Path {
        &self.settings.directory
    }

    pub fn format(&self) -> TableFormat {
        self.settings.format
    }

    /// 缓存键对应的文件路径
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.directory()
            .join(format!("{}.{}", key.file_stem(), self.format().ext()))
    }

    /// 查找缓存项
    ///
    /// # 返回
    ///
    /// - `Ok(Some(Table))`: 缓存命中
    /// - `Ok(None)`: 未命中或缓存文件无法解析
    pub fn lookup(&self, key: &CacheKey) -> Result<Option<Table>> {
        self.lookup_path(&self.entry_path(key))
    }

    /// 按路径查找缓存项，后缀不受支持时返回 `UnsupportedFormat`
    pub fn lookup_path(&self, path: &Path) -> Result<Option<Table>> {
        TableFormat::from_path(path)?;

        if !path.exists() {
            tracing::debug!(path = %path.display(), "缓存未命中");
            return Ok(None);
        }

        match codecs::read_table(path) {
            Ok(table) => {
                tracing::debug!(path = %path.display(), rows = table.height(), "缓存命中");
                Ok(Some(table))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "缓存文件解析失败，按未命中处理");
                Ok(None)
            }
        }
    }

    /// 写入缓存项（覆盖已有文件），返回写入路径
    pub fn store(&self, key: &CacheKey, table: &Table) -> Result<PathBuf> {
        let path = self.entry_path(key);
        self.store_path(&path, table)?;
        Ok(path)
    }

    /// 按路径写入缓存项
    ///
    /// 先校验后缀与表格结构；校验失败时不会创建任何文件。
    pub fn store_path(&self, path: &Path, table: &Table) -> Result<()> {
        let format = TableFormat::from_path(path)?;
        table.validate()?;

        if table.width() == 0 {
            tracing::debug!(path = %path.display(), "零列表格不写入缓存");
            return Ok(());
        }

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| DataError::io(dir, e))?;

        // 同一目录的写入在进程间串行化
        let lock_path = dir.join(LOCK_FILE_NAME);
        let lock_file = File::create(&lock_path).map_err(|e| DataError::io(&lock_path, e))?;
        lock_file
            .lock_exclusive()
            .map_err(|e| DataError::io(&lock_path, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| DataError::io(dir, e))?;
        codecs::write_to(tmp.as_file_mut(), table, format)?;
        tmp.persist(path).map_err(|e| DataError::io(path, e.error))?;

        tracing::debug!(
            path = %path.display(),
            rows = table.height(),
            format = format.ext(),
            "缓存已写入"
        );

        // 锁在 lock_file drop 时自动释放
        Ok(())
    }

    /// 带缓存地获取表格
    ///
    /// 缓存关闭时直接调用 `generate`；开启时先查缓存，未命中再生成并写入。
    /// 每次调用最多写入一次。
    pub async fn fetch<F, Fut, E>(
        &self,
        key: &CacheKey,
        generate: F,
    ) -> std::result::Result<Table, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Table, E>>,
        E: From<DataError>,
    {
        if !self.is_enabled() {
            return generate().await;
        }

        if let Some(table) = self.lookup(key)? {
            return Ok(table);
        }

        let table = generate().await?;
        self.store(key, &table)?;
        Ok(table)
    }

    /// 跳过读取，强制重新生成并覆盖缓存项（缓存关闭时等同于直接生成）
    pub async fn refresh<F, Fut, E>(
        &self,
        key: &CacheKey,
        generate: F,
    ) -> std::result::Result<Table, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Table, E>>,
        E: From<DataError>,
    {
        let table = generate().await?;
        if self.is_enabled() {
            self.store(key, &table)?;
        }
        Ok(table)
    }

    /// 列出缓存目录中的缓存项
    pub fn entries(&self) -> Result<Vec<CacheEntryInfo>> {
        let dir = self.directory();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| DataError::io(dir, e))? {
            let path = entry.map_err(|e| DataError::io(dir, e))?.path();
            if !path.is_file() {
                continue;
            }
            let Ok(format) = TableFormat::from_path(&path) else {
                continue;
            };
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !ENTRY_STEM.is_match(stem) {
                continue;
            }
            let key = stem.to_string();

            let metadata = fs::metadata(&path).map_err(|e| DataError::io(&path, e))?;
            let modified = metadata
                .modified()
                .map(DateTime::<Local>::from)
                .unwrap_or_else(|_| Local::now());

            entries.push(CacheEntryInfo {
                key,
                format,
                size: metadata.len(),
                modified,
                path,
            });
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// 删除所有缓存项，返回删除的缓存项数量
    ///
    /// 只删除符合缓存键命名的文件，同目录下的球员注册表和 Lahman 归档不受影响。
    pub fn purge(&self) -> Result<usize> {
        let entries = self.entries()?;
        for entry in &entries {
            fs::remove_file(&entry.path).map_err(|e| DataError::io(&entry.path, e))?;
        }

        tracing::info!(
            directory = %self.directory().display(),
            removed = entries.len(),
            "缓存已清空"
        );
        Ok(entries.len())
    }
}
