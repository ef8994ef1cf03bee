//! 统一数据访问入口
//!
//! `DataManager` 是库的上下文对象：构造时确定缓存配置并创建 HTTP 客户端，
//! 之后作为参数传递或放进 `Arc` 共享。没有全局单例。
//!
//! - 结果缓存：[`DataManager::cache`] / [`DataManager::fetch_with_cache`]
//! - 球员注册表：首次访问时加载，并发调用只触发一次下载
//! - Lahman 数据库：[`DataManager::lahman`]
//!
//! # 使用示例
//!
//! ```rust
//! use crate::data::DataManager;
//! use crate::models::LibraryConfig;
//!
//! let manager = DataManager::with_config(LibraryConfig::default())?;
//! let players = manager.players().await?;
//! let ruth = players.search("ruth", Some("babe"), false, false);
//! ```

use crate::core::error::AppResult;
use crate::core::http::{build_http_client, validate_url};
use crate::data::cache::{CacheKey, ResultCache};
use crate::data::DataError;
use crate::models::{LibraryConfig, Table};
use crate::services::lahman::LahmanDatabase;
use crate::services::player_lookup::registry::register_file_path;
use crate::services::player_lookup::{
    load_registry, ChadwickRegister, PlayerResolver, RegistrySource,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// 库上下文
pub struct DataManager {
    config: LibraryConfig,
    cache: ResultCache,
    registry_source: Arc<dyn RegistrySource>,
    players: OnceCell<Arc<PlayerResolver>>,
    lahman: LahmanDatabase,
}

impl DataManager {
    /// 按配置构造（使用远程 Chadwick 注册表）
    ///
    /// 注册表与 Lahman 归档地址必须是 http(s) URL，否则返回配置错误。
    pub fn with_config(config: LibraryConfig) -> AppResult<Self> {
        validate_url(&config.http.register_url)?;
        validate_url(&config.http.lahman_url)?;
        let client = build_http_client(&config.http)?;
        let source = Arc::new(ChadwickRegister::new(
            client.clone(),
            config.http.register_url.clone(),
        ));
        let lahman = LahmanDatabase::new(
            client,
            config.http.lahman_url.clone(),
            &config.cache.directory,
        );
        Ok(Self::assemble(config, source, lahman))
    }

    /// 使用自定义注册表来源与 Lahman 数据库构造
    pub fn with_sources(
        config: LibraryConfig,
        registry_source: Arc<dyn RegistrySource>,
        lahman: LahmanDatabase,
    ) -> Self {
        Self::assemble(config, registry_source, lahman)
    }

    fn assemble(
        config: LibraryConfig,
        registry_source: Arc<dyn RegistrySource>,
        lahman: LahmanDatabase,
    ) -> Self {
        tracing::debug!(
            cache_enabled = config.cache.enabled,
            cache_dir = %config.cache.directory.display(),
            format = config.cache.format.ext(),
            registry = registry_source.name(),
            "创建 DataManager"
        );

        Self {
            cache: ResultCache::new(config.cache.clone()),
            config,
            registry_source,
            players: OnceCell::new(),
            lahman,
        }
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// 结果缓存
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Lahman 数据库
    pub fn lahman(&self) -> &LahmanDatabase {
        &self.lahman
    }

    /// 本地注册表文件路径
    pub fn register_file(&self) -> PathBuf {
        register_file_path(&self.config.cache.directory)
    }

    /// 由函数名与参数派生缓存键，命中则返回缓存结果，否则调用 `generate` 并写入缓存
    pub async fn fetch_with_cache<F, Fut, E>(
        &self,
        function: &str,
        args: &[Value],
        kwargs: &BTreeMap<String, Value>,
        generate: F,
    ) -> std::result::Result<Table, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Table, E>>,
        E: From<DataError>,
    {
        let key = CacheKey::compute(function, args, kwargs);
        self.cache.fetch(&key, generate).await
    }

    /// 加载球员注册表并返回解析器
    ///
    /// 只有第一次成功的加载生效，之后的调用（包括不同的 `force_refresh` / `save`）
    /// 都直接返回已加载的结果。并发调用共享同一次加载；加载失败不会被记住。
    pub async fn load_registry(
        &self,
        force_refresh: bool,
        save: bool,
    ) -> AppResult<Arc<PlayerResolver>> {
        let resolver = self
            .players
            .get_or_try_init(|| async {
                let records = load_registry(
                    self.registry_source.as_ref(),
                    &self.register_file(),
                    force_refresh,
                    save,
                )
                .await?;
                Ok::<_, crate::core::AppError>(Arc::new(PlayerResolver::new(records)))
            })
            .await?;
        Ok(resolver.clone())
    }

    /// 球员解析器（按需加载注册表，不保存本地文件）
    pub async fn players(&self) -> AppResult<Arc<PlayerResolver>> {
        self.load_registry(false, false).await
    }
}
