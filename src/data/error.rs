//! 统一错误类型定义
//!
//! 使用 `thiserror` 定义数据层（表格编解码、结果缓存）的所有错误类型。

use std::path::PathBuf;
use thiserror::Error;

/// 数据层的统一错误类型
#[derive(Error, Debug)]
pub enum DataError {
    /// 文件 I/O 错误
    #[error("文件 I/O 错误: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 序列化错误（缓存键参数编码）
    #[error("JSON 序列化错误: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// CSV 读写错误
    #[error("CSV 编解码错误: {0}")]
    Csv(#[from] csv::Error),

    /// Parquet 读写错误
    #[error("Parquet 编解码错误: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Arrow 列构建错误
    #[error("Arrow 错误: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// 不支持的表格文件格式（仅支持 csv / parquet）
    #[error("不支持的表格格式: {path}（仅支持 .csv 与 .parquet）")]
    UnsupportedFormat { path: PathBuf },

    /// 表结构不合法（列长度不一致、列名重复或不匹配）
    #[error("表结构错误: {0}")]
    Schema(String),

    /// 资源未找到
    #[error("未找到资源: {0}")]
    NotFound(String),
}

/// 便于与现有代码集成的类型别名
pub type Result<T> = std::result::Result<T, DataError>;

impl DataError {
    /// 从 `std::io::Error` 和路径创建 I/O 错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// 为给定路径创建格式不支持错误
    pub fn unsupported(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedFormat { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DataError::NotFound("core/Batting.csv".to_string());
        assert_eq!(err.to_string(), "未找到资源: core/Batting.csv");
    }

    #[test]
    fn test_io_error_construction() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = DataError::io("/path/to/cache.csv", io_err);
        assert!(err.to_string().contains("/path/to/cache.csv"));
    }

    #[test]
    fn test_unsupported_format_mentions_path() {
        let err = DataError::unsupported("/tmp/table.xlsx");
        assert!(matches!(err, DataError::UnsupportedFormat { .. }));
        assert!(err.to_string().contains("table.xlsx"));
    }

    #[test]
    fn test_anyhow_conversion() {
        let err = DataError::Schema("列长度不一致".to_string());
        let anyhow_err: anyhow::Error = err.into();
        assert!(anyhow_err.to_string().contains("表结构错误"));
    }
}
