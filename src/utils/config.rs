use crate::models::LibraryConfig;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// 覆盖缓存目录的环境变量
pub const CACHE_DIR_ENV: &str = "BASEBALL_DATA_CACHE_DIR";

/// 配置目录 (~/.baseball-data)
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home_dir = dirs::home_dir().context("无法获取用户主目录")?;
    Ok(home_dir.join(".baseball-data"))
}

/// 默认配置文件路径
pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// 读取 TOML 配置（文件不存在时使用默认值），随后应用环境变量覆盖
pub fn load_config(path: &Path) -> anyhow::Result<LibraryConfig> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        toml::from_str::<LibraryConfig>(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?
    } else {
        tracing::debug!(path = %path.display(), "配置文件不存在，使用默认配置");
        LibraryConfig::default()
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

/// 从默认路径读取配置
pub fn load_default_config() -> anyhow::Result<LibraryConfig> {
    load_config(&config_path()?)
}

/// 保存配置到 TOML 文件（父目录不存在时创建）
pub fn save_config(path: &Path, config: &LibraryConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("创建配置目录失败: {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config).context("序列化配置失败")?;
    fs::write(path, content).with_context(|| format!("写入配置文件失败: {}", path.display()))?;
    Ok(())
}

fn apply_env_overrides(config: &mut LibraryConfig) {
    if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
        if !dir.trim().is_empty() {
            tracing::debug!(directory = %dir, "使用环境变量覆盖缓存目录");
            config.cache.directory = PathBuf::from(dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::codecs::TableFormat;
    use crate::models::LogLevel;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_missing_file_gives_defaults() {
        std::env::remove_var(CACHE_DIR_ENV);
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.format, TableFormat::Parquet);
        assert_eq!(config.http.timeout_secs, 60);
    }

    #[test]
    #[serial]
    fn test_partial_file_and_round_trip() {
        std::env::remove_var(CACHE_DIR_ENV);
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            "[cache]\nenabled = true\nformat = \"csv\"\n\n[log]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.format, TableFormat::Csv);
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.http.timeout_secs, 60);

        let copy = tmp.path().join("sub").join("copy.toml");
        save_config(&copy, &config).unwrap();
        let reread = load_config(&copy).unwrap();
        assert_eq!(reread.cache.format, TableFormat::Csv);
        assert_eq!(reread.cache.directory, config.cache.directory);
    }

    #[test]
    #[serial]
    fn test_env_override_cache_dir() {
        let tmp = TempDir::new().unwrap();
        std::env::set_var(CACHE_DIR_ENV, tmp.path());
        let config = load_config(&tmp.path().join("absent.toml")).unwrap();
        std::env::remove_var(CACHE_DIR_ENV);
        assert_eq!(config.cache.directory, tmp.path());
    }

    #[test]
    #[serial]
    fn test_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[cache\nenabled = ").unwrap();
        assert!(load_config(&path).is_err());
    }
}
